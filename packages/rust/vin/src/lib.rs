//! VIN validation and decoding.
//!
//! A VIN lookup is only worth a network round trip when the VIN has the full
//! 17 characters, so [`validate_vin`] gates every call. The production
//! decoder talks to a vPIC-compatible `DecodeVinValues` endpoint; the wizard
//! depends only on the [`VinDecoder`] trait so tests can swap in fakes.

use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use shipquote_shared::{Result, ShipQuoteError, VIN_LENGTH, VinConfig};
use tracing::{debug, info, instrument};

/// User-Agent string for decode requests.
const USER_AGENT: &str = concat!("ShipQuote/", env!("CARGO_PKG_VERSION"));

/// Message shown when a VIN is rejected locally.
pub const INVALID_VIN_MESSAGE: &str = "VIN must be exactly 17 characters";

// ---------------------------------------------------------------------------
// DecodedVin
// ---------------------------------------------------------------------------

/// What a decoder could tell us about a VIN. Any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedVin {
    pub year: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
}

impl DecodedVin {
    /// A result is only usable when both make and model came back.
    pub fn is_decodable(&self) -> bool {
        self.make.is_some() && self.model.is_some()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check that `vin` has exactly 17 characters (after trimming) and return it
/// trimmed. No network access happens here.
pub fn validate_vin(vin: &str) -> Result<&str> {
    let vin = vin.trim();
    if vin.chars().count() != VIN_LENGTH {
        return Err(ShipQuoteError::validation(INVALID_VIN_MESSAGE));
    }
    Ok(vin)
}

// ---------------------------------------------------------------------------
// Decoder seam
// ---------------------------------------------------------------------------

/// An external VIN lookup.
pub trait VinDecoder: Send + Sync {
    /// Decode a VIN that has already passed [`validate_vin`].
    fn decode(&self, vin: &str) -> impl Future<Output = Result<DecodedVin>> + Send;
}

// ---------------------------------------------------------------------------
// NHTSA vPIC decoder
// ---------------------------------------------------------------------------

/// Decoder backed by the NHTSA vPIC API (or anything serving the same shape).
#[derive(Debug, Clone)]
pub struct NhtsaDecoder {
    client: Client,
    base_url: String,
}

impl NhtsaDecoder {
    /// Build a decoder from the `[vin]` config section.
    pub fn new(config: &VinConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ShipQuoteError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn decode_url(&self, vin: &str) -> String {
        format!("{}/DecodeVinValues/{vin}?format=json", self.base_url)
    }
}

impl VinDecoder for NhtsaDecoder {
    #[instrument(skip(self), fields(vin = %vin))]
    async fn decode(&self, vin: &str) -> Result<DecodedVin> {
        let vin = validate_vin(vin)?;
        let url = self.decode_url(vin);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ShipQuoteError::Network(format!("VIN decode request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShipQuoteError::Network(format!(
                "VIN decode request failed: HTTP {status}"
            )));
        }

        let body: VpicResponse = response
            .json()
            .await
            .map_err(|e| ShipQuoteError::parse(format!("unexpected VIN decode response: {e}")))?;

        let decoded = body.into_decoded();
        if decoded.is_decodable() {
            info!(make = ?decoded.make, model = ?decoded.model, "VIN decoded");
        } else {
            debug!("VIN decode returned no make/model");
        }
        Ok(decoded)
    }
}

// ---------------------------------------------------------------------------
// Response mapping
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct VpicResponse {
    #[serde(rename = "Results", default)]
    results: Vec<VpicResult>,
}

#[derive(Debug, Default, Deserialize)]
struct VpicResult {
    #[serde(rename = "ModelYear", default)]
    model_year: Option<String>,
    #[serde(rename = "Make", default)]
    make: Option<String>,
    #[serde(rename = "Model", default)]
    model: Option<String>,
}

impl VpicResponse {
    fn into_decoded(self) -> DecodedVin {
        let first = self.results.into_iter().next().unwrap_or_default();
        DecodedVin {
            year: non_blank(first.model_year),
            make: non_blank(first.make),
            model: non_blank(first.model),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIN: &str = "1HGCM82633A123456";

    fn decoder_for(server: &wiremock::MockServer) -> NhtsaDecoder {
        NhtsaDecoder::new(&VinConfig {
            base_url: server.uri(),
            timeout_secs: 5,
        })
        .expect("build decoder")
    }

    #[test]
    fn vin_must_be_seventeen_characters() {
        assert!(validate_vin(VIN).is_ok());
        assert_eq!(validate_vin("  1HGCM82633A123456 ").unwrap(), VIN);

        let err = validate_vin("1HGCM82633A12345").unwrap_err();
        assert_eq!(err.to_string(), format!("validation error: {INVALID_VIN_MESSAGE}"));
        assert!(validate_vin("").is_err());
        assert!(validate_vin("1HGCM82633A1234567").is_err());
    }

    #[test]
    fn decodable_requires_make_and_model() {
        let full = DecodedVin {
            year: None,
            make: Some("HONDA".into()),
            model: Some("Accord".into()),
        };
        assert!(full.is_decodable());
        assert!(!DecodedVin::default().is_decodable());
    }

    #[test]
    fn blank_fields_map_to_none() {
        let body: VpicResponse = serde_json::from_str(
            r#"{"Count": 1, "Results": [{"ModelYear": "2003", "Make": "", "Model": " "}]}"#,
        )
        .expect("parse");
        let decoded = body.into_decoded();
        assert_eq!(decoded.year.as_deref(), Some("2003"));
        assert!(decoded.make.is_none());
        assert!(!decoded.is_decodable());
    }

    #[tokio::test]
    async fn decode_with_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path(format!("/DecodeVinValues/{VIN}")))
            .and(wiremock::matchers::query_param("format", "json"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(
                r#"{"Count": 1, "Message": "Results returned successfully",
                    "Results": [{"ModelYear": "2003", "Make": "HONDA", "Model": "Accord", "Trim": "EX-V6"}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let decoded = decoder_for(&server).decode(VIN).await.expect("decode");
        assert_eq!(
            decoded,
            DecodedVin {
                year: Some("2003".into()),
                make: Some("HONDA".into()),
                model: Some("Accord".into()),
            }
        );
    }

    #[tokio::test]
    async fn short_vin_never_reaches_the_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::any())
            .respond_with(wiremock::ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = decoder_for(&server)
            .decode("1HGCM82633A12345")
            .await
            .unwrap_err();
        assert!(err.is_local());
    }

    #[tokio::test]
    async fn server_error_is_a_network_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = decoder_for(&server).decode(VIN).await.unwrap_err();
        assert!(matches!(err, ShipQuoteError::Network(_)));
    }

    #[tokio::test]
    async fn garbage_body_is_a_parse_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = decoder_for(&server).decode(VIN).await.unwrap_err();
        assert!(matches!(err, ShipQuoteError::Parse { .. }));
    }
}
