// tests/common/mod.rs
// Shared fakes for the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use reddit_digest::config::{PipelineSettings, SectionConfig};
use reddit_digest::deliver::{DeliveryError, DigestSender};
use reddit_digest::render::RenderedDigest;
use reddit_digest::retry::RetryPolicy;
use reddit_digest::source::{FetchError, SortMode, SourceClient};
use reddit_digest::summarize::{GenerateError, Summarizer, SummaryService};
use reddit_digest::throttle::Throttle;
use reddit_digest::{DigestPipeline, Item, Reply};

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn item(source: &str, id: &str, age_secs: i64) -> Item {
    Item {
        id: id.into(),
        title: format!("{source} post {id}"),
        selftext: format!("body of {id}"),
        url: String::new(),
        permalink: format!("/r/{source}/comments/{id}/"),
        score: 100,
        num_comments: 2,
        subreddit: source.into(),
        author: "poster".into(),
        created_utc: now() - age_secs,
        is_self: true,
        over_18: false,
        link_flair_text: None,
    }
}

pub fn replies(id: &str, n: usize) -> Vec<Reply> {
    (0..n)
        .map(|i| Reply {
            id: format!("{id}_c{i}"),
            body: format!("comment {i} on {id}"),
            author: format!("commenter{i}"),
            score: 10 - i as i64,
        })
        .collect()
}

/// Scripted listings per source. Sources in `failing` error on every call.
#[derive(Default)]
pub struct FakeSource {
    pub top: HashMap<String, Vec<Item>>,
    pub hot: HashMap<String, Vec<Item>>,
    pub replies: HashMap<String, Vec<Reply>>,
    pub failing: Vec<String>,
    pub failing_replies: Vec<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeSource {
    pub fn with_top(mut self, source: &str, items: Vec<Item>) -> Self {
        self.top.insert(source.into(), items);
        self
    }
    pub fn with_hot(mut self, source: &str, items: Vec<Item>) -> Self {
        self.hot.insert(source.into(), items);
        self
    }
    pub fn with_replies(mut self, item_id: &str, r: Vec<Reply>) -> Self {
        self.replies.insert(item_id.into(), r);
        self
    }
    pub fn failing(mut self, source: &str) -> Self {
        self.failing.push(source.into());
        self
    }
    pub fn failing_replies(mut self, source: &str) -> Self {
        self.failing_replies.push(source.into());
        self
    }
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl SourceClient for FakeSource {
    async fn fetch_listing(
        &self,
        source: &str,
        sort: SortMode,
        limit: usize,
    ) -> Result<Vec<Item>, FetchError> {
        self.calls.lock().push(format!("{sort}:{source}"));
        if self.failing.iter().any(|s| s == source) {
            return Err(FetchError::Status {
                what: format!("r/{source} {sort}"),
                status: 503,
            });
        }
        let map = match sort {
            SortMode::Top => &self.top,
            SortMode::Hot => &self.hot,
        };
        Ok(map
            .get(source)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect())
    }

    async fn fetch_replies(
        &self,
        source: &str,
        item_id: &str,
        limit: usize,
    ) -> Result<Vec<Reply>, FetchError> {
        self.calls.lock().push(format!("replies:{source}:{item_id}"));
        if self.failing_replies.iter().any(|s| s == source) {
            return Err(FetchError::Status {
                what: format!("comments for {item_id}"),
                status: 500,
            });
        }
        Ok(self
            .replies
            .get(item_id)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .take(limit)
            .collect())
    }
}

/// Succeeds immediately with a structured summary naming the prompt's title.
pub struct EchoService {
    pub prompts: Mutex<Vec<String>>,
}

impl EchoService {
    pub fn new() -> Self {
        Self {
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SummaryService for EchoService {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.prompts.lock().push(prompt.to_string());
        let title = prompt
            .lines()
            .find_map(|l| l.strip_prefix("Title: "))
            .unwrap_or("?");
        Ok(format!("About {title}.\n\n• takeaway one\n• takeaway two"))
    }
    fn name(&self) -> &'static str {
        "echo"
    }
}

#[derive(Default)]
pub struct RecordingSender {
    pub sent: Mutex<Vec<(RenderedDigest, String)>>,
    pub fail: bool,
}

#[async_trait]
impl DigestSender for RecordingSender {
    async fn send(&self, digest: &RenderedDigest, recipient: &str) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError::Transport("smtp down".into()));
        }
        self.sent.lock().push((digest.clone(), recipient.to_string()));
        Ok(())
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

pub fn fast_settings() -> PipelineSettings {
    PipelineSettings {
        item_delay_ms: 0,
        summary_delay_ms: 0,
        ..PipelineSettings::default()
    }
}

pub fn fast_summarizer(service: Arc<dyn SummaryService>) -> Summarizer {
    Summarizer::new(
        service,
        RetryPolicy::new(3, Duration::from_millis(1), 2),
        Throttle::new(Duration::ZERO),
    )
}

pub fn pipeline(
    client: Arc<FakeSource>,
    service: Arc<dyn SummaryService>,
    sections: Vec<SectionConfig>,
) -> DigestPipeline {
    DigestPipeline::new(client, fast_summarizer(service), sections, fast_settings())
}
