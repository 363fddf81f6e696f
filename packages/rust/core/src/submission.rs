//! Validating and forwarding the finished lead.
//!
//! Only one submission may be in flight per pipeline. The in-flight flag is
//! held by a guard that lives inside the dispatch future, so a caller that
//! aborts a spawned submission also releases the flag.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use reqwest::Client;
use tracing::{info, instrument, warn};
use url::Url;

use shipquote_shared::{AppConfig, Result, ShipQuoteError, validate_endpoint};
use shipquote_vin::VinDecoder;

use crate::lead::LeadPayload;
use crate::notice::Notice;
use crate::wizard::QuoteWizard;

/// User-Agent string for lead submissions.
const USER_AGENT: &str = concat!("ShipQuote/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Sink seam
// ---------------------------------------------------------------------------

/// Where finished leads go.
pub trait LeadSink: Send + Sync {
    fn send(&self, lead: &LeadPayload) -> impl Future<Output = Result<()>> + Send;
}

/// POSTs the lead as JSON to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct HttpLeadSink {
    client: Client,
    endpoint: Url,
}

impl HttpLeadSink {
    pub fn new(endpoint: Url, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ShipQuoteError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    /// Build from the `[submission]` config section. Fails when no valid
    /// endpoint is configured.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let endpoint = validate_endpoint(config)?;
        Self::new(endpoint, config.submission.timeout_secs)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl LeadSink for HttpLeadSink {
    #[instrument(skip_all, fields(lead_id = %lead.lead_id, endpoint = %self.endpoint))]
    async fn send(&self, lead: &LeadPayload) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(lead)
            .send()
            .await
            .map_err(|e| ShipQuoteError::Network(format!("lead submission failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShipQuoteError::Network(format!(
                "lead submission failed: HTTP {status}"
            )));
        }
        info!(%status, "lead accepted");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// A validated lead plus the notices to show for either outcome.
#[derive(Debug, Clone)]
pub struct Submission {
    pub lead: LeadPayload,
    success: Notice,
    failure: Notice,
}

pub struct SubmissionPipeline<S> {
    sink: Arc<S>,
    in_flight: Arc<AtomicBool>,
}

impl<S> Clone for SubmissionPipeline<S> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<S: LeadSink> SubmissionPipeline<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink: Arc::new(sink),
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Check the wizard can be submitted and snapshot its lead.
    ///
    /// Every step has to pass its advance rule, not only the one shown last.
    ///
    /// Nothing is sent; this is the synchronous half of [`Self::submit`] for
    /// callers that want to spawn the network part.
    pub fn prepare<D: VinDecoder + 'static>(&self, wizard: &QuoteWizard<D>) -> Result<Submission> {
        if let Some(step) = wizard.first_incomplete_step() {
            let title = wizard
                .schema()
                .step(step)
                .map(|s| s.title.as_str())
                .unwrap_or_else(|| step.as_str());
            return Err(ShipQuoteError::validation(format!(
                "step '{title}' must be completed before submitting"
            )));
        }
        if self.is_in_flight() {
            return Err(ShipQuoteError::SubmissionInFlight);
        }

        let copy = &wizard.schema().copy;
        Ok(Submission {
            lead: wizard.lead(),
            success: Notice::success(&copy.success_title, &copy.success_description),
            failure: Notice::failure(&copy.failure_title, &copy.failure_description),
        })
    }

    /// Send a prepared lead. Sink failures come back as a failure notice.
    #[instrument(skip_all, fields(lead_id = %submission.lead.lead_id))]
    pub async fn dispatch(&self, submission: Submission) -> Result<Notice> {
        let Some(_guard) = InFlightGuard::claim(&self.in_flight) else {
            return Err(ShipQuoteError::SubmissionInFlight);
        };

        info!(vehicles = submission.lead.vehicles.len(), "submitting lead");
        match self.sink.send(&submission.lead).await {
            Ok(()) => Ok(submission.success),
            Err(e) => {
                warn!(error = %e, "lead submission failed");
                Ok(submission.failure)
            }
        }
    }

    /// Validate and send in one go. Wizard state is never modified.
    pub async fn submit<D: VinDecoder + 'static>(&self, wizard: &QuoteWizard<D>) -> Result<Notice> {
        let submission = self.prepare(wizard)?;
        self.dispatch(submission).await
    }
}

struct InFlightGuard(Arc<AtomicBool>);

impl InFlightGuard {
    fn claim(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(Arc::clone(flag)))
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use shipquote_schema::{ResolvedSchema, parse_form_config, resolve};
    use shipquote_shared::{ContactField, StepKey};
    use tokio::sync::Notify;

    use crate::wizard::tests::{FixedDecoder, fill_all};

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<LeadPayload>>,
        fail: bool,
    }

    impl RecordingSink {
        fn count(&self) -> usize {
            self.sent.lock().expect("lock").len()
        }
    }

    impl LeadSink for RecordingSink {
        async fn send(&self, lead: &LeadPayload) -> Result<()> {
            self.sent.lock().expect("lock").push(lead.clone());
            if self.fail {
                Err(ShipQuoteError::Network("HTTP 502".into()))
            } else {
                Ok(())
            }
        }
    }

    struct GatedSink {
        gate: Notify,
    }

    impl LeadSink for GatedSink {
        async fn send(&self, _lead: &LeadPayload) -> Result<()> {
            self.gate.notified().await;
            Ok(())
        }
    }

    fn filled_wizard() -> QuoteWizard<FixedDecoder> {
        let mut wizard = QuoteWizard::new(
            ResolvedSchema::default(),
            FixedDecoder::decoding("2003", "Honda", "Accord"),
        );
        fill_all(&mut wizard);
        while wizard.next() {}
        wizard
    }

    #[tokio::test]
    async fn scenario_a_full_run_submits() {
        let wizard = filled_wizard();
        let pipeline = SubmissionPipeline::new(RecordingSink::default());

        let notice = pipeline.submit(&wizard).await.expect("submit");
        assert!(notice.is_success());
        assert_eq!(notice.title, wizard.schema().copy.success_title);
        assert_eq!(pipeline.sink.count(), 1);
        assert!(!pipeline.is_in_flight());

        let sent = pipeline.sink.sent.lock().expect("lock");
        assert_eq!(sent[0].contact.email, "jane@example.com");
        assert_eq!(sent[0].vehicles[0].make, "Toyota");
    }

    #[tokio::test]
    async fn missing_contact_is_rejected_without_a_call() {
        let mut wizard = filled_wizard();
        wizard.set_contact_field(ContactField::Email, "  ");
        let pipeline = SubmissionPipeline::new(RecordingSink::default());

        let err = pipeline.submit(&wizard).await.unwrap_err();
        assert!(matches!(err, ShipQuoteError::Validation { .. }));
        assert_eq!(pipeline.sink.count(), 0);
    }

    #[tokio::test]
    async fn every_step_is_checked_when_contact_is_not_last() {
        let config = parse_form_config(
            r#"{"steps": [
                {"step_key": "vehicles"},
                {"step_key": "running"},
                {"step_key": "pickup"},
                {"step_key": "drops"},
                {"step_key": "transport"},
                {"step_key": "contact"},
                {"step_key": "timeframe"}
            ]}"#,
        )
        .expect("parse");
        let mut wizard = QuoteWizard::new(
            resolve(&config),
            FixedDecoder::decoding("2003", "Honda", "Accord"),
        );
        fill_all(&mut wizard);
        wizard.set_timeframe("");
        while wizard.next() {}
        assert!(wizard.is_terminal());
        assert_eq!(wizard.current_step(), StepKey::Timeframe);

        let pipeline = SubmissionPipeline::new(RecordingSink::default());
        let err = pipeline.submit(&wizard).await.unwrap_err();
        assert!(matches!(err, ShipQuoteError::Validation { .. }));
        assert_eq!(pipeline.sink.count(), 0);

        wizard.set_timeframe("asap");
        let notice = pipeline.submit(&wizard).await.expect("submit");
        assert!(notice.is_success());
        assert_eq!(pipeline.sink.count(), 1);
    }

    #[tokio::test]
    async fn sink_failure_becomes_failure_notice() {
        let wizard = filled_wizard();
        let before = wizard.state().clone();
        let pipeline = SubmissionPipeline::new(RecordingSink {
            fail: true,
            ..RecordingSink::default()
        });

        let notice = pipeline.submit(&wizard).await.expect("submit");
        assert!(!notice.is_success());
        assert_eq!(notice.description, wizard.schema().copy.failure_description);
        assert_eq!(wizard.state(), &before);
        assert!(!pipeline.is_in_flight());
    }

    #[tokio::test]
    async fn second_submit_is_rejected_and_abort_releases_the_flag() {
        let wizard = filled_wizard();
        let pipeline = SubmissionPipeline::new(GatedSink { gate: Notify::new() });

        let submission = pipeline.prepare(&wizard).expect("prepare");
        let background = pipeline.clone();
        let handle = tokio::spawn(async move { background.dispatch(submission).await });
        tokio::task::yield_now().await;

        assert!(pipeline.is_in_flight());
        assert!(matches!(
            pipeline.submit(&wizard).await,
            Err(ShipQuoteError::SubmissionInFlight)
        ));

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(!pipeline.is_in_flight());
        assert!(pipeline.prepare(&wizard).is_ok());
    }

    #[tokio::test]
    async fn http_sink_posts_json() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .and(wiremock::matchers::path("/leads"))
            .and(wiremock::matchers::body_partial_json(serde_json::json!({
                "pickup_location": "Denver, CO",
                "contact": {"name": "Jane Doe", "email": "jane@example.com"}
            })))
            .respond_with(wiremock::ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let endpoint = Url::parse(&format!("{}/leads", server.uri())).expect("url");
        let pipeline = SubmissionPipeline::new(HttpLeadSink::new(endpoint, 5).expect("sink"));

        let notice = pipeline.submit(&filled_wizard()).await.expect("submit");
        assert!(notice.is_success());
    }

    #[tokio::test]
    async fn http_sink_treats_non_2xx_as_failure() {
        let server = wiremock::MockServer::start().await;

        wiremock::Mock::given(wiremock::matchers::method("POST"))
            .respond_with(wiremock::ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let endpoint = Url::parse(&server.uri()).expect("url");
        let sink = HttpLeadSink::new(endpoint, 5).expect("sink");
        let lead = filled_wizard().lead();
        assert!(matches!(
            sink.send(&lead).await,
            Err(ShipQuoteError::Network(_))
        ));
    }

    #[test]
    fn from_config_requires_an_endpoint() {
        let mut config = AppConfig::default();
        assert!(HttpLeadSink::from_config(&config).is_err());

        config.submission.endpoint = Some("https://leads.example.com/api/quote".into());
        let sink = HttpLeadSink::from_config(&config).expect("sink");
        assert_eq!(sink.endpoint().path(), "/api/quote");
    }
}
