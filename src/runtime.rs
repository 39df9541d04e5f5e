// src/runtime.rs
//! Wires configuration into a runnable pipeline + sender.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::config::{AppConfig, SectionConfig};
use crate::deliver::{DigestSender, SmtpSender};
use crate::pipeline::{record_run, run_and_deliver, DigestPipeline, PipelineError, RunReport};
use crate::retry::RetryPolicy;
use crate::source::{RedditClient, SourceClient};
use crate::summarize::{GeminiService, MockService, Summarizer, SummaryService};
use crate::throttle::Throttle;

/// Pick the summarization backend.
///
/// * `SUMMARY_TEST_MODE=mock` → deterministic mock.
/// * Otherwise Gemini, which needs `GEMINI_API_KEY`.
pub fn build_service(cfg: &AppConfig) -> Result<Arc<dyn SummaryService>, PipelineError> {
    if cfg.summary_mock {
        return Ok(Arc::new(MockService::default()));
    }
    let key = cfg
        .gemini_api_key
        .as_deref()
        .ok_or_else(|| PipelineError::Config("GEMINI_API_KEY not configured".into()))?;
    let svc = GeminiService::new(key, cfg.gemini_model.as_deref())
        .map_err(|e| PipelineError::Config(format!("http client: {e}")))?;
    Ok(Arc::new(svc))
}

pub fn build_sender(cfg: &AppConfig) -> Result<Arc<dyn DigestSender>, PipelineError> {
    let smtp = cfg
        .smtp
        .as_ref()
        .ok_or_else(|| PipelineError::Config("SMTP_HOST not configured".into()))?;
    let sender =
        SmtpSender::from_config(smtp).map_err(|e| PipelineError::Config(e.to_string()))?;
    Ok(Arc::new(sender))
}

pub struct DigestRuntime {
    pub cfg: AppConfig,
    pub pipeline: DigestPipeline,
    pub sender: Arc<dyn DigestSender>,
}

impl DigestRuntime {
    /// Build the production runtime: Reddit client, configured summarizer, SMTP.
    pub fn from_config(cfg: AppConfig, sections: Vec<SectionConfig>) -> Result<Self, PipelineError> {
        let sender = build_sender(&cfg)?;
        Self::with_sender(cfg, sections, sender)
    }

    /// Same as [`from_config`](Self::from_config) with a caller-chosen sender.
    pub fn with_sender(
        cfg: AppConfig,
        sections: Vec<SectionConfig>,
        sender: Arc<dyn DigestSender>,
    ) -> Result<Self, PipelineError> {
        let service = build_service(&cfg)?;
        let client: Arc<dyn SourceClient> = Arc::new(
            RedditClient::new().map_err(|e| PipelineError::Config(format!("http client: {e}")))?,
        );
        let summarizer = Summarizer::new(
            service,
            RetryPolicy::default(),
            Throttle::new(Duration::from_millis(cfg.pipeline.summary_delay_ms)),
        );

        info!(
            summarizer = summarizer.service_name(),
            sender = sender.name(),
            sections = sections.len(),
            "digest runtime ready"
        );

        let pipeline = DigestPipeline::new(client, summarizer, sections, cfg.pipeline.clone());
        Ok(Self {
            cfg,
            pipeline,
            sender,
        })
    }

    /// The recipient is checked here, before any fetching.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        run_and_deliver(
            &self.pipeline,
            self.sender.as_ref(),
            self.cfg.recipient.as_deref(),
        )
        .await
    }
}

/// Something that performs one full digest run. The HTTP layer depends on
/// this rather than on the concrete runtime.
#[async_trait]
pub trait DigestRunner: Send + Sync {
    async fn run_digest(&self) -> Result<RunReport, PipelineError>;
}

/// Builds a fresh runtime from the startup configuration for every run and
/// never runs two digests at once.
pub struct EnvRunner {
    cfg: AppConfig,
    sections: Vec<SectionConfig>,
    lock: Mutex<()>,
}

impl EnvRunner {
    pub fn new(cfg: AppConfig, sections: Vec<SectionConfig>) -> Self {
        Self {
            cfg,
            sections,
            lock: Mutex::new(()),
        }
    }
}

#[async_trait]
impl DigestRunner for EnvRunner {
    async fn run_digest(&self) -> Result<RunReport, PipelineError> {
        let _guard = self.lock.lock().await;
        let runtime = match DigestRuntime::from_config(self.cfg.clone(), self.sections.clone()) {
            Ok(runtime) => runtime,
            Err(e) => {
                let result = Err(e);
                record_run(&result);
                return result;
            }
        };
        runtime.run().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn cfg(pairs: &[(&str, &str)]) -> AppConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn mock_mode_needs_no_key() {
        let svc = build_service(&cfg(&[("SUMMARY_TEST_MODE", "mock")])).unwrap();
        assert_eq!(svc.name(), "mock");
    }

    #[test]
    fn missing_key_is_config_error() {
        let err = build_service(&cfg(&[])).err().unwrap();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn missing_smtp_is_config_error() {
        let err = build_sender(&cfg(&[])).err().unwrap();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[tokio::test]
    async fn env_runner_reports_missing_smtp_as_config_error() {
        let runner = EnvRunner::new(
            cfg(&[("SUMMARY_TEST_MODE", "mock"), ("DIGEST_EMAIL", "me@example.com")]),
            crate::config::default_sections(),
        );
        let err = runner.run_digest().await.unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
        assert!(err.to_string().contains("SMTP_HOST"), "got: {err}");
    }

    #[tokio::test]
    async fn runtime_without_recipient_fails_on_run() {
        let sender: Arc<dyn DigestSender> =
            Arc::new(crate::deliver::FileSender::new(std::env::temp_dir().join("unused.html")));
        let runtime = DigestRuntime::with_sender(
            cfg(&[("SUMMARY_TEST_MODE", "mock")]),
            crate::config::default_sections(),
            sender,
        )
        .unwrap();
        let err = runtime.run().await.unwrap_err();
        assert!(err.to_string().contains("DIGEST_EMAIL"), "got: {err}");
    }
}
