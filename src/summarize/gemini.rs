// src/summarize/gemini.rs
//! Google Gemini `generateContent` over plain REST.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{GenerateError, SummaryService};

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiService {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl GeminiService {
    pub fn new(api_key: impl Into<String>, model: Option<&str>) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .user_agent("reddit-digest/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.unwrap_or(DEFAULT_MODEL).to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}
#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}
#[derive(Serialize)]
struct Req<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}
#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}
#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}
#[derive(Deserialize)]
struct RespPart {
    #[serde(default)]
    text: String,
}

/// Concatenated text parts of the first candidate.
fn first_candidate_text(body: &str) -> Result<String, GenerateError> {
    let resp: Resp =
        serde_json::from_str(body).map_err(|e| GenerateError::Failed(format!("decode: {e}")))?;
    let text: String = resp
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();
    Ok(text)
}

#[async_trait]
impl SummaryService for GeminiService {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        if self.api_key.is_empty() {
            return Err(GenerateError::Failed("missing API key".into()));
        }

        let req = Req {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let resp = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| GenerateError::Failed(e.to_string()))?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerateError::RateLimited);
        }
        if !status.is_success() {
            return Err(GenerateError::Failed(format!("HTTP {status}")));
        }

        let body = resp
            .text()
            .await
            .map_err(|e| GenerateError::Failed(e.to_string()))?;
        first_candidate_text(&body)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_parts_of_first_candidate() {
        let body = r#"{"candidates":[
            {"content":{"parts":[{"text":"One point."},{"text":"\n• a"}],"role":"model"}},
            {"content":{"parts":[{"text":"ignored"}]}}
        ]}"#;
        assert_eq!(first_candidate_text(body).unwrap(), "One point.\n• a");
    }

    #[test]
    fn no_candidates_is_empty_text() {
        assert_eq!(first_candidate_text(r#"{"candidates":[]}"#).unwrap(), "");
        assert_eq!(first_candidate_text("{}").unwrap(), "");
    }

    #[test]
    fn url_contains_model() {
        let g = GeminiService::new("k", None)
            .unwrap()
            .with_endpoint("http://localhost:1/v1beta/");
        assert_eq!(
            g.url(),
            "http://localhost:1/v1beta/models/gemini-2.0-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn too_many_requests_is_rate_limited_other_errors_fail() {
        let base = crate::testing::serve_script(vec![(429, "slow down"), (500, "boom")]).await;
        let g = GeminiService::new("k", None).unwrap().with_endpoint(base);

        let first = g.generate("hi").await.unwrap_err();
        assert!(matches!(first, GenerateError::RateLimited), "got: {first:?}");
        assert!(first.is_rate_limit());

        let second = g.generate("hi").await.unwrap_err();
        assert!(matches!(second, GenerateError::Failed(ref m) if m.contains("500")), "got: {second:?}");
        assert!(!second.is_rate_limit());
    }

    #[tokio::test]
    async fn success_returns_candidate_text() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Short take."}]}}]}"#;
        let base = crate::testing::serve_script(vec![(200, body)]).await;
        let g = GeminiService::new("k", None).unwrap().with_endpoint(base);
        assert_eq!(g.generate("hi").await.unwrap(), "Short take.");
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let g = GeminiService::new("", None).unwrap();
        let err = g.generate("hi").await.unwrap_err();
        assert!(matches!(err, GenerateError::Failed(_)));
    }
}
