use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum MirageError {
    #[error("Fetch error (status: {status:?}): {message}")]
    Fetch {
        status: Option<StatusCode>,
        message: String,
    },

    /// The provider reached the page but the page itself answered with an error.
    #[error("Target page error (status: {status}): {message}")]
    TargetPage { status: StatusCode, message: String },

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Model provider error (status: {status:?}): {message}")]
    Model {
        status: Option<StatusCode>,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MirageError {
    pub fn fetch(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        MirageError::Fetch {
            status,
            message: message.into(),
        }
    }

    pub fn target_page(status: StatusCode, message: impl Into<String>) -> Self {
        MirageError::TargetPage {
            status,
            message: message.into(),
        }
    }

    pub fn model(status: Option<StatusCode>, message: impl Into<String>) -> Self {
        MirageError::Model {
            status,
            message: message.into(),
        }
    }

    pub fn extraction(message: impl Into<String>) -> Self {
        MirageError::Extraction(message.into())
    }

    pub fn generation(message: impl Into<String>) -> Self {
        MirageError::Generation(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        MirageError::Validation(message.into())
    }

    /// Attribute a model-provider failure to the extraction stage.
    pub fn into_extraction(self) -> Self {
        match self {
            MirageError::Model { status, message } => MirageError::Extraction(match status {
                Some(code) => format!("model request failed (status {}): {message}", code.as_u16()),
                None => format!("model request failed: {message}"),
            }),
            MirageError::Serialization(e) => MirageError::Extraction(e.to_string()),
            other => other,
        }
    }

    /// Attribute a model-provider failure to the generation stage.
    pub fn into_generation(self) -> Self {
        match self {
            MirageError::Model { status, message } => MirageError::Generation(match status {
                Some(code) => format!("model request failed (status {}): {message}", code.as_u16()),
                None => format!("model request failed: {message}"),
            }),
            MirageError::Serialization(e) => MirageError::Generation(e.to_string()),
            other => other,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MirageError::Fetch { .. } | MirageError::TargetPage { .. } => ErrorCategory::Fetch,
            MirageError::Extraction(_) => ErrorCategory::Extraction,
            MirageError::Generation(_) => ErrorCategory::Generation,
            MirageError::Validation(_) => ErrorCategory::Validation,
            MirageError::Config(_) => ErrorCategory::Config,
            MirageError::Model { .. } | MirageError::Io(_) | MirageError::Serialization(_) => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn to_payload(&self) -> ErrorPayload {
        let category = self.category();
        match self {
            MirageError::Fetch { status, message } => {
                let remediation = match status.map(|s| s.as_u16()) {
                    Some(401) | Some(403) => "Check FIRECRAWL_API_KEY; the scraping provider rejected the credentials.",
                    Some(402) => "The scraping provider account is out of credits.",
                    Some(429) => "Rate limited by the scraping provider; wait before retrying.",
                    _ => "Verify the URL is reachable and publicly accessible, then retry.",
                };
                ErrorPayload::new(category, message.to_string(), remediation)
            }
            MirageError::TargetPage { status, message } => {
                let remediation = match status.as_u16() {
                    401 | 403 => "The target site refused the request; it may require a login or block automated access. Try a public page.",
                    404 | 410 => "The target page does not exist; check the URL.",
                    429 => "The target site is rate limiting requests; wait before retrying.",
                    _ => "The target page returned an error; check that it loads in a browser.",
                };
                ErrorPayload::new(category, message.to_string(), remediation)
            }
            MirageError::Extraction(msg) => ErrorPayload::new(
                category,
                msg.to_string(),
                "The model could not infer a brand from the page; retry or try a page with more visible styling.",
            ),
            MirageError::Generation(msg) => {
                let remediation = if msg.to_ascii_lowercase().contains("component type") {
                    "Use one of: landing_page, email, button, card, hero_section, pricing_table, feature_grid, testimonial, cta."
                } else {
                    "Retry the generation; simplify the customization text if the model output was malformed."
                };
                ErrorPayload::new(category, msg.to_string(), remediation)
            }
            MirageError::Validation(msg) => ErrorPayload::new(
                category,
                msg.to_string(),
                "Check the tool arguments against the published input schema.",
            ),
            MirageError::Config(msg) => {
                let lower = msg.to_ascii_lowercase();
                let remediation = if lower.contains("firecrawl_api_key") {
                    "Set FIRECRAWL_API_KEY or [firecrawl].api_key in the config file."
                } else if lower.contains("google_api_key") || lower.contains("gemini") {
                    "Set GOOGLE_API_KEY (or GEMINI_API_KEY) or [gemini].api_key in the config file."
                } else {
                    "Check the config file (--config or ~/.config/mirage/config.toml)."
                };
                ErrorPayload::new(category, msg.to_string(), remediation)
            }
            MirageError::Model { status, message } => ErrorPayload::new(
                category,
                format!("Model provider error (status {:?}): {}", status, message),
                "Check GOOGLE_API_KEY, the model name and provider quotas; retry after waiting.",
            ),
            MirageError::Io(e) => ErrorPayload::new(
                category,
                e.to_string(),
                "Check stdio/file permissions.",
            ),
            MirageError::Serialization(e) => ErrorPayload::new(
                category,
                e.to_string(),
                "Re-run with --verbose for details.",
            ),
        }
    }
}

impl From<ParseError> for MirageError {
    fn from(err: ParseError) -> Self {
        MirageError::Validation(format!("invalid URL: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, MirageError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Fetch,
    Extraction,
    Generation,
    Validation,
    Config,
    Internal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            operation: None,
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = Some(operation.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_payload_mentions_key_on_unauthorized() {
        let err = MirageError::fetch(Some(StatusCode::UNAUTHORIZED), "Unauthorized");
        let payload = err.to_payload();
        assert_eq!(payload.category, ErrorCategory::Fetch);
        let remediation = payload.remediation.unwrap_or_default();
        assert!(
            remediation.contains("FIRECRAWL_API_KEY"),
            "expected remediation to mention the scraping key, got: {remediation}"
        );
    }

    #[test]
    fn target_page_refusal_points_at_the_site_not_the_key() {
        let err = MirageError::target_page(
            StatusCode::FORBIDDEN,
            "https://example.com/ responded with status 403: Forbidden",
        );
        let payload = err.to_payload();
        let remediation = payload.remediation.unwrap_or_default();

        assert_eq!(payload.category, ErrorCategory::Fetch);
        assert!(!remediation.contains("FIRECRAWL_API_KEY"), "{remediation}");
        assert!(remediation.contains("target site refused"), "{remediation}");
    }

    #[test]
    fn target_page_rate_limit_is_attributed_to_the_site() {
        let err = MirageError::target_page(StatusCode::TOO_MANY_REQUESTS, "slow down");
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(remediation.contains("target site is rate limiting"), "{remediation}");
    }

    #[test]
    fn fetch_payload_uses_reachability_hint_without_status() {
        let err = MirageError::fetch(None, "connection refused");
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(remediation.contains("reachable"));
    }

    #[test]
    fn model_error_becomes_extraction_error() {
        let err = MirageError::model(Some(StatusCode::TOO_MANY_REQUESTS), "quota exceeded")
            .into_extraction();
        match err {
            MirageError::Extraction(msg) => {
                assert!(msg.contains("429"), "status should be kept: {msg}");
                assert!(msg.contains("quota exceeded"));
            }
            other => panic!("expected extraction error, got {other:?}"),
        }
    }

    #[test]
    fn model_error_becomes_generation_error() {
        let err = MirageError::model(None, "timed out").into_generation();
        assert!(matches!(err, MirageError::Generation(ref m) if m.contains("timed out")));
    }

    #[test]
    fn stage_conversion_keeps_other_variants() {
        let err = MirageError::fetch(None, "down").into_generation();
        assert!(matches!(err, MirageError::Fetch { .. }));
    }

    #[test]
    fn generation_payload_lists_component_types() {
        let err = MirageError::generation("unrecognized component type 'banner'");
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(remediation.contains("pricing_table"));
    }

    #[test]
    fn config_payload_points_at_google_key() {
        let err = MirageError::Config("GOOGLE_API_KEY is required".to_string());
        let remediation = err.to_payload().remediation.unwrap_or_default();
        assert!(remediation.contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn payload_serializes_operation_when_present() {
        let payload = MirageError::validation("url is required")
            .to_payload()
            .with_operation("extract_brand");
        let json = serde_json::to_value(&payload).expect("serialize payload");
        assert_eq!(json["operation"], "extract_brand");
        assert_eq!(json["category"], "validation");
        assert_eq!(json["message"], "url is required");
    }
}
