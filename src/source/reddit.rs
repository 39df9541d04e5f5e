// src/source/reddit.rs
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::{FetchError, SortMode, SourceClient};
use crate::types::{Item, Reply};

pub const DEFAULT_BASE_URL: &str = "https://www.reddit.com";

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

#[derive(Debug, Deserialize)]
struct Listing<T> {
    data: ListingData<T>,
}

#[derive(Debug, Deserialize)]
struct ListingData<T> {
    #[serde(default = "Vec::new")]
    children: Vec<Child<T>>,
}

#[derive(Debug, Deserialize)]
struct Child<T> {
    kind: String,
    data: T,
}

/// Public JSON endpoints of reddit.com (no OAuth).
#[derive(Clone)]
pub struct RedditClient {
    http: reqwest::Client,
    base_url: String,
}

impl RedditClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the client at another host (local fixtures, proxies).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn listing_url(&self, source: &str, sort: SortMode, limit: usize) -> String {
        match sort {
            SortMode::Top => format!("{}/r/{source}/top.json?t=day&limit={limit}", self.base_url),
            SortMode::Hot => format!("{}/r/{source}/hot.json?limit={limit}", self.base_url),
        }
    }

    pub fn replies_url(&self, source: &str, item_id: &str, limit: usize) -> String {
        format!(
            "{}/r/{source}/comments/{item_id}.json?limit={limit}&sort=top",
            self.base_url
        )
    }

    async fn get_body(&self, url: &str, what: &str) -> Result<String, FetchError> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                what: what.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                what: what.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().await.map_err(|source| FetchError::Transport {
            what: what.to_string(),
            source,
        })
    }
}

/// Items of a listing response, in listing order. A child that does not
/// decode as a post is skipped; the rest of the listing is kept.
pub fn parse_listing(body: &str) -> Result<Vec<Item>, serde_json::Error> {
    let listing: Listing<serde_json::Value> = serde_json::from_str(body)?;
    Ok(listing
        .data
        .children
        .into_iter()
        .filter_map(|c| match serde_json::from_value::<Item>(c.data) {
            Ok(item) => Some(item),
            Err(e) => {
                tracing::debug!(kind = %c.kind, error = %e, "skipping undecodable listing child");
                None
            }
        })
        .collect())
}

/// Top-level comments from a comments response: `[post_listing, comment_listing]`.
/// `more` stubs and anything that is not a `t1` comment are skipped.
pub fn parse_replies(body: &str, limit: usize) -> Result<Vec<Reply>, serde_json::Error> {
    let raw: Vec<serde_json::Value> = serde_json::from_str(body)?;
    Ok(replies_from_values(raw, limit))
}

fn replies_from_values(raw: Vec<serde_json::Value>, limit: usize) -> Vec<Reply> {
    let Some(comments) = raw.into_iter().nth(1) else {
        return Vec::new();
    };
    let Ok(listing) = serde_json::from_value::<Listing<serde_json::Value>>(comments) else {
        return Vec::new();
    };
    listing
        .data
        .children
        .into_iter()
        .filter(|c| c.kind == "t1")
        .filter_map(|c| serde_json::from_value::<Reply>(c.data).ok())
        .take(limit)
        .collect()
}

fn decode_error(what: &str, e: serde_json::Error) -> FetchError {
    FetchError::Decode {
        what: what.to_string(),
        reason: e.to_string(),
    }
}

#[async_trait]
impl SourceClient for RedditClient {
    async fn fetch_listing(
        &self,
        source: &str,
        sort: SortMode,
        limit: usize,
    ) -> Result<Vec<Item>, FetchError> {
        let url = self.listing_url(source, sort, limit);
        let what = format!("r/{source} {sort}");
        let body = self.get_body(&url, &what).await?;
        let items = parse_listing(&body).map_err(|e| decode_error(&what, e))?;
        tracing::debug!(source, %sort, count = items.len(), "listing fetched");
        Ok(items)
    }

    async fn fetch_replies(
        &self,
        source: &str,
        item_id: &str,
        limit: usize,
    ) -> Result<Vec<Reply>, FetchError> {
        let url = self.replies_url(source, item_id, limit);
        let what = format!("comments for {item_id}");
        let body = self.get_body(&url, &what).await?;
        parse_replies(&body, limit).map_err(|e| decode_error(&what, e))
    }
}
