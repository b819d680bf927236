use thiserror::Error;
use url::Url;

use crate::error::MirageError;

#[derive(Debug, Error)]
pub enum TargetParseError {
    #[error("url is required")]
    Empty,
    #[error("Invalid URL '{value}': {message}. Hint: include http(s):// and ensure the URL is well-formed.")]
    InvalidUrl { value: String, message: String },
    #[error("Unsupported URL scheme '{scheme}' in '{value}'. Only http and https pages can be scraped.")]
    UnsupportedScheme { value: String, scheme: String },
    #[error("URL '{value}' has no host.")]
    MissingHost { value: String },
}

impl From<TargetParseError> for MirageError {
    fn from(err: TargetParseError) -> Self {
        MirageError::Validation(err.to_string())
    }
}

/// Validate a page URL before any provider is contacted.
///
/// Bare hosts such as `example.com` are accepted and upgraded to `https://`. Input
/// that already names a scheme (`mailto:`, `javascript:`) is parsed as written.
pub fn parse_target_url(value: &str) -> Result<Url, TargetParseError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TargetParseError::Empty);
    }

    let candidate = if trimmed.contains("://") || explicit_scheme(trimmed).is_some() {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| TargetParseError::InvalidUrl {
        value: trimmed.to_string(),
        message: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(TargetParseError::UnsupportedScheme {
                value: trimmed.to_string(),
                scheme: scheme.to_string(),
            })
        }
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(TargetParseError::MissingHost {
            value: trimmed.to_string(),
        });
    }

    Ok(url)
}

/// The `scheme` of `scheme:rest`, unless the colon introduces a port (`host:8080`).
fn explicit_scheme(value: &str) -> Option<&str> {
    let (head, rest) = value.split_once(':')?;
    let mut chars = head.chars();
    let is_scheme = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    (is_scheme && !rest.starts_with(|c: char| c.is_ascii_digit())).then_some(head)
}
