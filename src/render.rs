// src/render.rs
//! HTML email body and subject for a finished digest.

use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_safe};
use once_cell::sync::OnceCell;
use regex::Regex;
use std::fmt::Write as _;

use crate::types::{DigestRun, SummarizedItem};

const ACCENT: &str = "#ff4500";

/// A digest ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDigest {
    pub subject: String,
    pub html: String,
}

/// Long-form date, e.g. `Friday, October 16, 2026`.
pub fn format_date(now: DateTime<Utc>) -> String {
    now.format("%A, %B %-d, %Y").to_string()
}

/// Relative age of a post: `12m ago`, `5h ago`, `2d ago`.
pub fn format_age(now_unix: i64, created_utc: i64) -> String {
    let diff = now_unix.saturating_sub(created_utc).max(0);
    let hours = diff / 3600;
    if hours < 1 {
        format!("{}m ago", diff / 60)
    } else if hours < 24 {
        format!("{hours}h ago")
    } else {
        format!("{}d ago", hours / 24)
    }
}

/// `1234567` → `1,234,567`.
pub fn format_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// First non-blank line becomes the lead paragraph; later `•` lines become a list.
/// Anything else in the summary is dropped.
pub fn format_summary(summary: &str) -> String {
    static RE_BULLET: OnceCell<Regex> = OnceCell::new();
    let re_bullet = RE_BULLET.get_or_init(|| Regex::new(r"^•\s*").expect("bullet regex"));

    let mut lines = summary.lines().map(str::trim).filter(|l| !l.is_empty());
    let lead = lines.next().unwrap_or_default();
    let bullets: Vec<&str> = lines.filter(|l| l.starts_with('•')).collect();

    let mut html = format!(
        r#"<p style="margin: 8px 0 4px 0; color: #4a4a4a;">{}</p>"#,
        encode_safe(lead)
    );
    if !bullets.is_empty() {
        html.push_str(r#"<ul style="margin: 4px 0 0 0; padding-left: 20px; color: #666;">"#);
        for b in bullets {
            let text = re_bullet.replace(b, "");
            let _ = write!(
                html,
                r#"<li style="margin: 2px 0; font-size: 14px;">{}</li>"#,
                encode_safe(&text)
            );
        }
        html.push_str("</ul>");
    }
    html
}

fn render_item(out: &mut String, it: &SummarizedItem, now_unix: i64) {
    let href = format!("https://reddit.com{}", it.item.permalink);
    let _ = write!(
        out,
        r#"
          <div style="margin-bottom: 20px; padding: 12px 16px; background: #f8f9fa; border-radius: 8px; border-left: 3px solid {ACCENT};">
            <a href="{href}" style="color: #1a1a1b; text-decoration: none; font-weight: 600; font-size: 15px; line-height: 1.3;">{title}</a>
            <div style="margin-top: 4px;">
              <span style="color: {ACCENT}; font-size: 13px;">▲ {score}</span>
              <span style="color: #7c7c7c; font-size: 13px; margin-left: 12px;">💬 {comments}</span>
              <span style="color: #7c7c7c; font-size: 13px; margin-left: 12px;">🕐 {age}</span>
            </div>
            {summary}
          </div>"#,
        href = encode_double_quoted_attribute(&href),
        title = encode_safe(&it.item.title),
        score = format_thousands(it.item.score),
        comments = it.item.num_comments,
        age = format_age(now_unix, it.item.created_utc),
        summary = format_summary(&it.summary),
    );
}

/// Full HTML document for `run`, dated `now`.
pub fn render_html(run: &DigestRun, now: DateTime<Utc>) -> String {
    let now_unix = now.timestamp();
    let mut body = String::new();
    for section in &run.sections {
        let _ = write!(
            body,
            r#"
      <h2 style="color: #1a1a1b; margin-top: 32px; margin-bottom: 16px; font-size: 24px; border-bottom: 3px solid {ACCENT}; padding-bottom: 8px;">{}</h2>"#,
            encode_safe(&section.name)
        );
        for src in &section.sources {
            let _ = write!(
                body,
                r#"
        <h3 style="color: {ACCENT}; margin-top: 20px; margin-bottom: 12px; font-size: 16px;">r/{}</h3>"#,
                encode_safe(&src.source)
            );
            for it in &src.items {
                render_item(&mut body, it, now_unix);
            }
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body style="font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 600px; margin: 0 auto; padding: 20px; background: #ffffff;">
  <h1 style="color: #1a1a1b; margin-bottom: 8px; font-size: 28px;">Reddit Digest</h1>
  <p style="color: #7c7c7c; margin-top: 0; margin-bottom: 32px; font-size: 14px;">{date}</p>{body}
  <hr style="border: none; border-top: 1px solid #edeff1; margin: 32px 0;">
  <p style="color: #7c7c7c; font-size: 12px; text-align: center;">
    Generated with AI summaries • <a href="https://reddit.com" style="color: {ACCENT};">reddit.com</a>
  </p>
</body>
</html>
"#,
        date = format_date(now),
    )
}

pub fn render(run: &DigestRun, now: DateTime<Utc>) -> RenderedDigest {
    RenderedDigest {
        subject: format!(
            "Reddit Digest - {} ({} posts)",
            format_date(now),
            run.total_items()
        ),
        html: render_html(run, now),
    }
}
