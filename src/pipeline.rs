// src/pipeline.rs
//! Run orchestration: sections → sources → items, strictly sequential.
//!
//! A failing source is logged and skipped; it never aborts its section or the
//! run. Only configuration, empty output, and delivery are run-level failures.

use std::sync::Arc;

use chrono::Utc;
use metrics::{counter, gauge};
use serde::Serialize;

use crate::aggregate::aggregate;
use crate::config::{PipelineSettings, SectionConfig};
use crate::deliver::{DeliveryError, DigestSender};
use crate::render;
use crate::source::{FetchError, SourceClient};
use crate::summarize::Summarizer;
use crate::throttle::Throttle;
use crate::types::{DigestRun, DigestSection, SourceResult, SummarizedItem};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("No posts found")]
    NoContent,
    #[error("delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Outcome of processing one source.
#[derive(Debug)]
pub enum SourceOutcome {
    Collected(SourceResult),
    /// Fetched fine but nothing survived the window filter.
    Empty,
    Failed(FetchError),
}

/// Response body of a successful run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RunReport {
    pub success: bool,
    pub sections: usize,
    pub posts: usize,
}

impl RunReport {
    pub fn for_run(run: &DigestRun) -> Self {
        Self {
            success: true,
            sections: run.sections.len(),
            posts: run.total_items(),
        }
    }
}

pub struct DigestPipeline {
    client: Arc<dyn SourceClient>,
    summarizer: Summarizer,
    sections: Vec<SectionConfig>,
    settings: PipelineSettings,
    item_gate: Throttle,
}

impl DigestPipeline {
    pub fn new(
        client: Arc<dyn SourceClient>,
        summarizer: Summarizer,
        sections: Vec<SectionConfig>,
        settings: PipelineSettings,
    ) -> Self {
        let item_gate = Throttle::from_millis(settings.item_delay_ms);
        Self {
            client,
            summarizer,
            sections,
            settings,
            item_gate,
        }
    }

    /// Aggregate one source, then summarize its newest items in order.
    pub async fn process_source(&self, source: &str) -> SourceOutcome {
        match self.collect_source(source).await {
            Ok(Some(result)) => SourceOutcome::Collected(result),
            Ok(None) => SourceOutcome::Empty,
            Err(e) => SourceOutcome::Failed(e),
        }
    }

    async fn collect_source(&self, source: &str) -> Result<Option<SourceResult>, FetchError> {
        let s = &self.settings;
        let candidates = aggregate(
            self.client.as_ref(),
            source,
            s.top_limit,
            s.hot_limit,
            s.window_secs,
        )
        .await?;

        let mut items = Vec::with_capacity(s.items_per_source);
        for item in candidates.into_iter().take(s.items_per_source) {
            self.item_gate.acquire().await;
            let replies = self
                .client
                .fetch_replies(source, &item.id, s.replies_per_item)
                .await?;
            let summary = self.summarizer.summarize(&item, &replies).await;
            tracing::debug!(source, item = %item.id, replies = replies.len(), "item summarized");
            counter!("digest_items_summarized_total").increment(1);
            items.push(SummarizedItem {
                item,
                summary,
                top_replies: replies,
            });
        }

        if items.is_empty() {
            return Ok(None);
        }
        // Aggregation already yields this order; kept as the final guarantee.
        items.sort_by(|a, b| b.item.created_utc.cmp(&a.item.created_utc));
        Ok(Some(SourceResult {
            source: source.to_string(),
            items,
        }))
    }

    /// Build the digest. Fails only when no section produced anything.
    pub async fn run(&self) -> Result<DigestRun, PipelineError> {
        tracing::info!(
            sections = self.sections.len(),
            summarizer = self.summarizer.service_name(),
            "starting digest generation"
        );

        let mut run = DigestRun::default();
        for section in &self.sections {
            tracing::info!(section = %section.name, "processing section");

            let mut outcomes = Vec::with_capacity(section.sources.len());
            for source in &section.sources {
                tracing::info!(section = %section.name, source = %source, "fetching source");
                let outcome = self.process_source(source).await;
                match &outcome {
                    SourceOutcome::Collected(r) => {
                        tracing::info!(source = %source, posts = r.items.len(), "source processed")
                    }
                    SourceOutcome::Empty => {
                        tracing::info!(source = %source, posts = 0, "source processed")
                    }
                    SourceOutcome::Failed(e) => {
                        tracing::warn!(source = %source, error = %e, "source failed, skipping");
                        counter!("digest_sources_failed_total").increment(1);
                    }
                }
                outcomes.push(outcome);
            }

            let results: Vec<SourceResult> = outcomes
                .into_iter()
                .filter_map(|o| match o {
                    SourceOutcome::Collected(r) => Some(r),
                    _ => None,
                })
                .collect();

            if !results.is_empty() {
                run.sections.push(DigestSection {
                    name: section.name.clone(),
                    sources: results,
                });
            }
        }

        if run.is_empty() {
            return Err(PipelineError::NoContent);
        }
        Ok(run)
    }
}

/// Run the pipeline and deliver the digest once.
///
/// The recipient is checked before any fetching; an empty run never reaches
/// the sender.
pub async fn run_and_deliver(
    pipeline: &DigestPipeline,
    sender: &dyn DigestSender,
    recipient: Option<&str>,
) -> Result<RunReport, PipelineError> {
    let result = run_and_deliver_inner(pipeline, sender, recipient).await;
    record_run(&result);
    result
}

/// Count and log the outcome of one run, including runs that failed before
/// the pipeline could be built.
pub fn record_run(result: &Result<RunReport, PipelineError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(PipelineError::Config(_)) => "config_error",
        Err(PipelineError::NoContent) => "no_content",
        Err(PipelineError::Delivery(_)) => "delivery_error",
    };
    counter!("digest_runs_total", "outcome" => outcome).increment(1);
    gauge!("digest_last_run_ts").set(Utc::now().timestamp() as f64);

    match result {
        Ok(report) => tracing::info!(
            posts = report.posts,
            sections = report.sections,
            "digest sent"
        ),
        Err(e) => tracing::error!(error = %e, "digest generation failed"),
    }
}

async fn run_and_deliver_inner(
    pipeline: &DigestPipeline,
    sender: &dyn DigestSender,
    recipient: Option<&str>,
) -> Result<RunReport, PipelineError> {
    let recipient = recipient
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| PipelineError::Config("DIGEST_EMAIL not configured".into()))?;

    let run = pipeline.run().await?;
    let rendered = render::render(&run, Utc::now());

    tracing::info!(sender = sender.name(), "sending digest");
    sender.send(&rendered, recipient).await?;
    Ok(RunReport::for_run(&run))
}
