// src/types.rs
//! Data model shared by the aggregation, summarization, and rendering stages.
//! Everything here lives for exactly one pipeline run.

use serde::{Deserialize, Deserializer, Serialize};

/// A single post within a source, as returned by the listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub permalink: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub num_comments: u64,
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub author: String,
    /// Unix seconds. Reddit serializes this as a float.
    #[serde(deserialize_with = "de_epoch_secs")]
    pub created_utc: i64,
    #[serde(default)]
    pub is_self: bool,
    #[serde(default)]
    pub over_18: bool,
    #[serde(default)]
    pub link_flair_text: Option<String>,
}

/// A comment attached to an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Reply {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SummarizedItem {
    #[serde(flatten)]
    pub item: Item,
    pub summary: String,
    pub top_replies: Vec<Reply>,
}

/// Summarized items for one source, newest first. Never empty once assembled.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SourceResult {
    pub source: String,
    pub items: Vec<SummarizedItem>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DigestSection {
    pub name: String,
    pub sources: Vec<SourceResult>,
}

/// The assembled output of one run, handed to the renderer.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DigestRun {
    pub sections: Vec<DigestSection>,
}

impl DigestRun {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn total_items(&self) -> usize {
        self.sections
            .iter()
            .flat_map(|s| s.sources.iter())
            .map(|r| r.items.len())
            .sum()
    }
}

fn de_epoch_secs<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Number::deserialize(d)?;
    if let Some(i) = v.as_i64() {
        return Ok(i);
    }
    v.as_f64()
        .map(|f| f.trunc() as i64)
        .ok_or_else(|| serde::de::Error::custom("created_utc is not a number"))
}
