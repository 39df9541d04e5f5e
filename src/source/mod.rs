// src/source/mod.rs
pub mod reddit;

use std::fmt;

use async_trait::async_trait;

use crate::types::{Item, Reply};

pub use reddit::RedditClient;

/// Which ranked listing to read from a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    Top,
    Hot,
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortMode::Top => f.write_str("top"),
            SortMode::Hot => f.write_str("hot"),
        }
    }
}

/// Failure talking to a source. An empty listing is `Ok(vec![])`, never an error.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("failed to fetch {what}: HTTP {status}")]
    Status { what: String, status: u16 },
    #[error("request for {what} failed: {source}")]
    Transport {
        what: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected response for {what}: {reason}")]
    Decode { what: String, reason: String },
}

/// Read-only access to a discussion community.
#[async_trait]
pub trait SourceClient: Send + Sync {
    async fn fetch_listing(
        &self,
        source: &str,
        sort: SortMode,
        limit: usize,
    ) -> Result<Vec<Item>, FetchError>;

    async fn fetch_replies(
        &self,
        source: &str,
        item_id: &str,
        limit: usize,
    ) -> Result<Vec<Reply>, FetchError>;
}
