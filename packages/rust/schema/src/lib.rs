//! Form-configuration loading and step schema resolution.
//!
//! The quote wizard's step order, copy, and option sets come from a CMS
//! payload. This crate loads that payload (from disk or over HTTP), then
//! resolves it against built-in defaults into a [`ResolvedSchema`] that is
//! total: no consumer ever has to fall back on its own.

mod defaults;
pub mod payload;
pub mod resolver;

use std::path::Path;
use std::time::Duration;

use reqwest::Client;
use shipquote_shared::{Result, ShipQuoteError};
use tracing::{info, instrument, warn};

pub use payload::{
    CopyDefinition, FieldDefinition, FormConfig, OptionDefinition, StepDefinition,
    parse_form_config,
};
pub use resolver::{Choice, FieldKey, ResolvedCopy, ResolvedField, ResolvedSchema, ResolvedStep, resolve};

/// Default timeout in seconds for fetching the form configuration.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// User-Agent string for form configuration requests.
const USER_AGENT: &str = concat!("ShipQuote/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Fetch options
// ---------------------------------------------------------------------------

/// Configuration for loading the form payload.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Timeout for HTTP requests in seconds.
    pub timeout_secs: u64,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry points
// ---------------------------------------------------------------------------

/// Load a form configuration from an http(s) URL or a file path.
#[instrument(skip_all, fields(source = %source))]
pub async fn load_form_config(source: &str, opts: &FetchOptions) -> Result<FormConfig> {
    let source = source.trim();
    if source.starts_with("http://") || source.starts_with("https://") {
        fetch_form_config(source, opts).await
    } else {
        read_form_config(Path::new(source))
    }
}

/// Load and resolve the schema for one wizard mount.
///
/// Never fails: a missing source means built-in defaults, and a source that
/// cannot be loaded is logged and replaced by defaults as well.
pub async fn load_schema(source: Option<&str>, opts: &FetchOptions) -> ResolvedSchema {
    let Some(source) = source.map(str::trim).filter(|s| !s.is_empty()) else {
        info!("no form configuration source, using built-in defaults");
        return ResolvedSchema::default();
    };

    match load_form_config(source, opts).await {
        Ok(config) => resolve(&config),
        Err(e) => {
            warn!(error = %e, source, "form configuration unavailable, using built-in defaults");
            ResolvedSchema::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_form_config(path: &Path) -> Result<FormConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ShipQuoteError::io(path, e))?;
    parse_form_config(&content)
}

async fn fetch_form_config(url: &str, opts: &FetchOptions) -> Result<FormConfig> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| ShipQuoteError::Network(format!("failed to build HTTP client: {e}")))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ShipQuoteError::Network(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ShipQuoteError::Network(format!("{url}: HTTP {status}")));
    }

    let body = response
        .text()
        .await
        .map_err(|e| ShipQuoteError::Network(format!("{url}: failed to read body: {e}")))?;

    let config = parse_form_config(&body)?;
    info!(steps = config.steps.len(), "form configuration fetched");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipquote_shared::{CANONICAL_STEP_ORDER, StepKey};

    #[tokio::test]
    async fn load_schema_without_source_uses_defaults() {
        let schema = load_schema(None, &FetchOptions::default()).await;
        assert_eq!(schema.step_keys(), CANONICAL_STEP_ORDER.to_vec());
    }

    #[tokio::test]
    async fn load_schema_from_fixture_file() {
        let schema = load_schema(
            Some("../../../fixtures/json/form-config.fixture.json"),
            &FetchOptions::default(),
        )
        .await;
        assert_eq!(schema.copy.submit_label, "Get My Free Quote");
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_defaults() {
        let schema = load_schema(Some("/nonexistent/form.json"), &FetchOptions::default()).await;
        assert_eq!(schema, ResolvedSchema::default());
    }

    #[tokio::test]
    async fn fetch_with_mock_server() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/quote-form"))
            .respond_with(wiremock::ResponseTemplate::new(200).set_body_string(
                r#"{"steps": [{"step_key": "timeframe"}, {"step_key": "transport"}]}"#,
            ))
            .mount(&server)
            .await;

        let url = format!("{}/quote-form", server.uri());
        let schema = load_schema(Some(&url), &FetchOptions::default()).await;
        assert_eq!(schema.steps[0].key, StepKey::Timeframe);
        assert_eq!(schema.steps[1].key, StepKey::Transport);
        assert_eq!(schema.steps[2].key, StepKey::Vehicles);
    }

    #[tokio::test]
    async fn fetch_error_status_is_a_network_error() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .respond_with(wiremock::ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let url = format!("{}/quote-form", server.uri());
        let err = load_form_config(&url, &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ShipQuoteError::Network(_)));

        let schema = load_schema(Some(&url), &FetchOptions::default()).await;
        assert_eq!(schema, ResolvedSchema::default());
    }
}
