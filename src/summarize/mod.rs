// src/summarize/mod.rs
//! Post summaries: prompt construction, service abstraction, and the
//! retrying summarizer that never fails outward.

pub mod gemini;

use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;

use crate::retry::{RetryError, RetryPolicy};
use crate::throttle::Throttle;
use crate::types::{Item, Reply};

pub use gemini::GeminiService;

/// Returned in place of a summary whenever the service cannot produce one.
pub const SUMMARY_UNAVAILABLE: &str = "Summary unavailable.";

/// Replies included in a prompt.
pub const MAX_PROMPT_REPLIES: usize = 3;
/// Per-reply character cap inside a prompt.
pub const REPLY_CHAR_CAP: usize = 300;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// The service said "too many requests". The only retryable failure.
    #[error("rate limited by summarization service")]
    RateLimited,
    #[error("summarization service returned no text")]
    Empty,
    #[error("summarization failed: {0}")]
    Failed(String),
}

impl GenerateError {
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, GenerateError::RateLimited)
    }
}

/// Opaque text-in/text-out generation.
#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
    fn name(&self) -> &'static str;
}

/// Deterministic service for local runs and tests.
#[derive(Debug, Clone)]
pub struct MockService {
    pub fixed: String,
}

impl Default for MockService {
    fn default() -> Self {
        Self {
            fixed: "Mock summary of the post.\n\n• First takeaway\n• Second takeaway".to_string(),
        }
    }
}

#[async_trait]
impl SummaryService for MockService {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Ok(self.fixed.clone())
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Build the summarization prompt for one post and its top replies.
pub fn build_prompt(item: &Item, replies: &[Reply]) -> String {
    let content = if item.is_self {
        item.selftext.clone()
    } else {
        format!("Link: {}", item.url)
    };
    let content = if content.trim().is_empty() {
        "(no text content)".to_string()
    } else {
        content
    };

    let reply_lines: Vec<String> = replies
        .iter()
        .take(MAX_PROMPT_REPLIES)
        .map(|r| {
            let body: String = r.body.chars().take(REPLY_CHAR_CAP).collect();
            format!("- {} ({} pts): {}", r.author, r.score, body)
        })
        .collect();
    let reply_text = if reply_lines.is_empty() {
        "(no comments)".to_string()
    } else {
        reply_lines.join("\n")
    };

    format!(
        "Summarize this Reddit post concisely.

Title: {title}
Content: {content}
Top comments:
{reply_text}

Format your response EXACTLY like this:
[One sentence summary of the main point]

• [Key takeaway 1]
• [Key takeaway 2]
• [Key takeaway 3 if relevant]

Keep bullet points short (under 15 words each). Max 3 bullets. No preamble.",
        title = item.title,
    )
}

/// Wraps a [`SummaryService`] with rate-limit retries and request pacing.
pub struct Summarizer {
    service: Arc<dyn SummaryService>,
    retry: RetryPolicy,
    pacing: Throttle,
}

impl Summarizer {
    pub fn new(service: Arc<dyn SummaryService>, retry: RetryPolicy, pacing: Throttle) -> Self {
        Self {
            service,
            retry,
            pacing,
        }
    }

    pub fn service_name(&self) -> &'static str {
        self.service.name()
    }

    /// Always yields usable text; failures collapse to [`SUMMARY_UNAVAILABLE`].
    pub async fn summarize(&self, item: &Item, replies: &[Reply]) -> String {
        let prompt = build_prompt(item, replies);
        let prompt = prompt.as_str();
        let service = self.service.as_ref();
        let pacing = &self.pacing;

        let result = self
            .retry
            .run(
                "summarize",
                |_attempt| async move {
                    pacing.acquire().await;
                    match service.generate(prompt).await {
                        Ok(text) if text.trim().is_empty() => Err(GenerateError::Empty),
                        Ok(text) => Ok(text.trim().to_string()),
                        Err(e) => Err(e),
                    }
                },
                GenerateError::is_rate_limit,
            )
            .await;

        match result {
            Ok(summary) => summary,
            Err(RetryError::Exhausted { attempts, last }) => {
                tracing::warn!(item = %item.id, attempts, error = %last, "summary retries exhausted");
                counter!("digest_summary_fallback_total", "reason" => "exhausted").increment(1);
                SUMMARY_UNAVAILABLE.to_string()
            }
            Err(RetryError::Fatal { attempt, error }) => {
                tracing::warn!(item = %item.id, attempt, error = %error, "summary failed");
                counter!("digest_summary_fallback_total", "reason" => "failed").increment(1);
                SUMMARY_UNAVAILABLE.to_string()
            }
        }
    }
}
