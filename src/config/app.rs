// src/config/app.rs
//! Runtime settings read from the process environment (`.env` in dev).

use std::env;

use crate::aggregate::DEFAULT_WINDOW_SECS;

pub const DEFAULT_EMAIL_FROM: &str = "Reddit Digest <digest@localhost>";

/// Knobs for one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    pub top_limit: usize,
    pub hot_limit: usize,
    pub window_secs: u64,
    /// How many aggregated items per source get summarized.
    pub items_per_source: usize,
    pub replies_per_item: usize,
    /// Spacing between items within a run.
    pub item_delay_ms: u64,
    /// Spacing between calls to the summarization service.
    pub summary_delay_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            top_limit: 10,
            hot_limit: 10,
            window_secs: DEFAULT_WINDOW_SECS,
            items_per_source: 3,
            replies_per_item: 3,
            item_delay_ms: 200,
            summary_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub user: Option<String>,
    pub pass: Option<String>,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Digest recipient. Required only when delivering.
    pub recipient: Option<String>,
    pub cron_secret: Option<String>,
    /// Development mode skips the bearer check.
    pub dev_mode: bool,
    pub gemini_api_key: Option<String>,
    pub gemini_model: Option<String>,
    /// `SUMMARY_TEST_MODE=mock` swaps the real service for a fixed one.
    pub summary_mock: bool,
    pub smtp: Option<SmtpConfig>,
    pub pipeline: PipelineSettings,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    /// Build from any key → value lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let dev_mode = matches!(
            get("APP_ENV").unwrap_or_default().to_ascii_lowercase().as_str(),
            "development" | "dev" | "local"
        );

        let smtp = get("SMTP_HOST").map(|host| SmtpConfig {
            host,
            user: get("SMTP_USER"),
            pass: get("SMTP_PASS"),
            from: get("DIGEST_EMAIL_FROM").unwrap_or_else(|| DEFAULT_EMAIL_FROM.to_string()),
        });

        let d = PipelineSettings::default();
        let num = |k: &str, dflt: u64| get(k).and_then(|v| v.parse::<u64>().ok()).unwrap_or(dflt);
        let pipeline = PipelineSettings {
            top_limit: num("DIGEST_TOP_LIMIT", d.top_limit as u64) as usize,
            hot_limit: num("DIGEST_HOT_LIMIT", d.hot_limit as u64) as usize,
            window_secs: num("DIGEST_WINDOW_SECS", d.window_secs),
            items_per_source: num("DIGEST_ITEMS_PER_SOURCE", d.items_per_source as u64) as usize,
            replies_per_item: num("DIGEST_REPLIES_PER_ITEM", d.replies_per_item as u64) as usize,
            item_delay_ms: num("DIGEST_ITEM_DELAY_MS", d.item_delay_ms),
            summary_delay_ms: num("DIGEST_SUMMARY_DELAY_MS", d.summary_delay_ms),
        };

        Self {
            recipient: get("DIGEST_EMAIL"),
            cron_secret: get("CRON_SECRET"),
            dev_mode,
            gemini_api_key: get("GEMINI_API_KEY"),
            gemini_model: get("GEMINI_MODEL"),
            summary_mock: get("SUMMARY_TEST_MODE").is_some_and(|v| v == "mock"),
            smtp,
            pipeline,
        }
    }
}
