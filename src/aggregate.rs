// src/aggregate.rs
//! Per-source candidate list: top + hot listings, deduplicated, window-filtered,
//! newest first.

use std::collections::HashSet;

use crate::source::{FetchError, SortMode, SourceClient};
use crate::types::Item;

pub const DEFAULT_WINDOW_SECS: u64 = 24 * 60 * 60;

/// Merge two listings fetched at `now` (unix seconds).
///
/// `top` is consulted first, so on an id collision the top-listing copy wins.
/// Adult items and items created before `now - window_secs` are dropped.
/// The result is sorted by `created_utc` descending and never truncated.
pub fn merge_listings(now: i64, top: Vec<Item>, hot: Vec<Item>, window_secs: u64) -> Vec<Item> {
    let cutoff = now.saturating_sub(i64::try_from(window_secs).unwrap_or(i64::MAX));

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::with_capacity(top.len() + hot.len());
    for item in top.into_iter().chain(hot) {
        if !seen.insert(item.id.clone()) {
            continue;
        }
        if item.over_18 || item.created_utc < cutoff {
            continue;
        }
        out.push(item);
    }

    // stable: equal timestamps keep listing order
    out.sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
    out
}

/// Fetch both listings concurrently and merge them. Either fetch failing fails
/// the whole source; there is no partial merge.
pub async fn aggregate(
    client: &dyn SourceClient,
    source: &str,
    top_limit: usize,
    hot_limit: usize,
    window_secs: u64,
) -> Result<Vec<Item>, FetchError> {
    let (top, hot) = tokio::try_join!(
        client.fetch_listing(source, SortMode::Top, top_limit),
        client.fetch_listing(source, SortMode::Hot, hot_limit),
    )?;

    let fetched = top.len() + hot.len();
    let now = chrono::Utc::now().timestamp();
    let merged = merge_listings(now, top, hot, window_secs);

    tracing::debug!(source, fetched, kept = merged.len(), "listings merged");
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, created_utc: i64) -> Item {
        Item {
            id: id.into(),
            title: format!("title {id}"),
            selftext: String::new(),
            url: String::new(),
            permalink: format!("/r/test/comments/{id}/"),
            score: 1,
            num_comments: 0,
            subreddit: "test".into(),
            author: "someone".into(),
            created_utc,
            is_self: true,
            over_18: false,
            link_flair_text: None,
        }
    }

    #[test]
    fn duplicate_keeps_top_copy() {
        let now = 1_000_000;
        let mut from_top = item("x", now - 10);
        from_top.title = "from top".into();
        let mut from_hot = item("x", now - 10);
        from_hot.title = "from hot".into();

        let out = merge_listings(now, vec![from_top], vec![from_hot, item("y", now - 5)], 600);
        assert_eq!(out.len(), 2);
        let x = out.iter().find(|i| i.id == "x").unwrap();
        assert_eq!(x.title, "from top");
    }

    #[test]
    fn window_boundary() {
        let now = 1_000_000;
        let w = 86_400u64;
        let edge = now - w as i64;
        let out = merge_listings(
            now,
            vec![item("old", edge - 1), item("edge", edge), item("inside", edge + 1)],
            vec![],
            w,
        );
        let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["inside", "edge"]);
    }

    #[test]
    fn adult_items_are_dropped() {
        let now = 5_000;
        let mut nsfw = item("n", now - 1);
        nsfw.over_18 = true;
        let out = merge_listings(now, vec![nsfw], vec![item("ok", now - 2)], 600);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "ok");
    }

    #[test]
    fn sorted_newest_first() {
        let now = 10_000;
        let out = merge_listings(
            now,
            vec![item("a", now - 300), item("b", now - 10)],
            vec![item("c", now - 100), item("d", now - 1)],
            600,
        );
        let ids: Vec<_> = out.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["d", "b", "c", "a"]);
        assert!(out.windows(2).all(|w| w[0].created_utc >= w[1].created_utc));
    }
}
