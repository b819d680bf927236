//! External provider clients.
//!
//! The rest of the crate talks to providers only through the [`Scraper`] and
//! [`TextModel`] traits, so orchestration can be exercised without network access.

pub mod firecrawl;
pub mod gemini;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::Result;
use crate::types::ScrapedPage;

pub use firecrawl::FirecrawlClient;
pub use gemini::GeminiClient;

/// Fetches page content for a URL.
#[async_trait]
pub trait Scraper: Send + Sync {
    /// Scrape `url`, optionally capturing a screenshot.
    ///
    /// Failures are reported as [`crate::MirageError::Fetch`].
    async fn scrape(&self, url: &str, include_screenshot: bool) -> Result<ScrapedPage>;
}

/// Produces a text completion for a prompt.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Failures are reported as [`crate::MirageError::Model`]; callers attribute
    /// them to a pipeline stage.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub format: ResponseFormat,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            system: None,
            prompt: prompt.into(),
            format: ResponseFormat::Text,
        }
    }

    pub fn json(prompt: impl Into<String>) -> Self {
        Self {
            format: ResponseFormat::Json,
            ..Self::text(prompt)
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Build an error message from a provider error body, falling back to the status.
pub(crate) fn error_message(
    provider: &str,
    status: StatusCode,
    body: &str,
    retry_after: Option<&str>,
) -> String {
    let fallback = format!("{provider} returned status {}", status.as_u16());
    let parsed = serde_json::from_str::<Value>(body).ok();
    let from_body = parsed.as_ref().and_then(|value| {
        let error = value.get("error")?;
        error
            .as_str()
            .or_else(|| error.get("message").and_then(Value::as_str))
            .map(str::to_owned)
    });

    match (status, retry_after, from_body) {
        (StatusCode::TOO_MANY_REQUESTS, Some(retry), Some(msg)) => {
            format!("{msg} (rate limited, retry after {retry}s)")
        }
        (StatusCode::TOO_MANY_REQUESTS, Some(retry), None) => {
            format!("rate limited by {provider}, retry after {retry}s")
        }
        (StatusCode::TOO_MANY_REQUESTS, None, Some(msg)) => format!("{msg} (rate limited)"),
        (StatusCode::TOO_MANY_REQUESTS, None, None) => format!("rate limited by {provider}"),
        (_, _, Some(msg)) => msg,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_reads_string_error_field() {
        let msg = error_message(
            "Firecrawl",
            StatusCode::BAD_REQUEST,
            r#"{"success":false,"error":"Invalid URL"}"#,
            None,
        );
        assert_eq!(msg, "Invalid URL");
    }

    #[test]
    fn error_message_reads_nested_error_message() {
        let msg = error_message(
            "Gemini",
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#,
            None,
        );
        assert_eq!(msg, "API key not valid");
    }

    #[test]
    fn error_message_mentions_retry_after_on_rate_limit() {
        let msg = error_message("Firecrawl", StatusCode::TOO_MANY_REQUESTS, "", Some("30"));
        assert_eq!(msg, "rate limited by Firecrawl, retry after 30s");
    }

    #[test]
    fn error_message_falls_back_to_status() {
        let msg = error_message("Gemini", StatusCode::BAD_GATEWAY, "<html>", None);
        assert_eq!(msg, "Gemini returned status 502");
    }

    #[test]
    fn json_request_keeps_prompt_and_system() {
        let req = GenerationRequest::json("hello").with_system("be terse");
        assert_eq!(req.format, ResponseFormat::Json);
        assert_eq!(req.prompt, "hello");
        assert_eq!(req.system.as_deref(), Some("be terse"));
    }
}
