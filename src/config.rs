use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{MirageError, Result};

pub const DEFAULT_FIRECRAWL_URL: &str = "https://api.firecrawl.dev";
pub const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-lite";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub firecrawl: FirecrawlConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FirecrawlConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for FirecrawlConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_FIRECRAWL_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_GEMINI_URL.to_string(),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            timeout: Duration::from_secs(60),
            temperature: 0.4,
        }
    }
}

impl Config {
    /// Load config from an explicit path, the central config, or defaults.
    /// Priority: explicit path > ~/.config/mirage/config.toml > defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let source = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::central_config_path().filter(|p| p.is_file()),
        };

        match source {
            Some(p) => {
                let raw = std::fs::read_to_string(&p).map_err(|e| {
                    MirageError::Config(format!("Failed to read config {}: {e}", p.display()))
                })?;
                Self::from_toml_str(&raw).map_err(|e| {
                    MirageError::Config(format!("Invalid config ({}): {e}", p.display()))
                })
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| MirageError::Config(e.to_string()))
    }

    pub fn central_config_path() -> Option<PathBuf> {
        let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
        Some(
            PathBuf::from(home)
                .join(".config")
                .join("mirage")
                .join("config.toml"),
        )
    }

    /// Overlay credentials and the model name from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("FIRECRAWL_API_KEY") {
            self.firecrawl.api_key = Some(key);
        }
        if let Some(key) = non_empty("GOOGLE_API_KEY").or_else(|| non_empty("GEMINI_API_KEY")) {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = non_empty("MIRAGE_GEMINI_MODEL") {
            self.gemini.model = model;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        require_key(self.firecrawl.api_key.as_deref(), "FIRECRAWL_API_KEY")?;
        require_key(self.gemini.api_key.as_deref(), "GOOGLE_API_KEY")?;
        validate_base_url(&self.firecrawl.base_url, "firecrawl.base_url")?;
        validate_base_url(&self.gemini.base_url, "gemini.base_url")?;

        if self.firecrawl.timeout.is_zero() || self.gemini.timeout.is_zero() {
            return Err(MirageError::Config(
                "provider timeouts must be greater than zero".into(),
            ));
        }
        if self.gemini.model.trim().is_empty() {
            return Err(MirageError::Config("gemini.model must not be empty".into()));
        }
        if !(0.0..=2.0).contains(&self.gemini.temperature) {
            return Err(MirageError::Config(format!(
                "gemini.temperature must be within 0.0..=2.0, got {}",
                self.gemini.temperature
            )));
        }
        Ok(())
    }

    /// One-line summary for verbose logging; never includes credentials.
    pub fn summary(&self) -> String {
        format!(
            "firecrawl={} (timeout {}s, key {}), gemini={} model={} (timeout {}s, temperature {:.2}, key {})",
            self.firecrawl.base_url,
            self.firecrawl.timeout.as_secs(),
            presence(self.firecrawl.api_key.as_deref()),
            self.gemini.base_url,
            self.gemini.model,
            self.gemini.timeout.as_secs(),
            self.gemini.temperature,
            presence(self.gemini.api_key.as_deref()),
        )
    }
}

fn presence(key: Option<&str>) -> &'static str {
    if key.is_some_and(|k| !k.trim().is_empty()) {
        "set"
    } else {
        "missing"
    }
}

fn require_key(key: Option<&str>, name: &str) -> Result<()> {
    match key {
        Some(k) if !k.trim().is_empty() => Ok(()),
        _ => Err(MirageError::Config(format!("{name} is required"))),
    }
}

fn validate_base_url(value: &str, field: &str) -> Result<()> {
    let url = url::Url::parse(value)
        .map_err(|e| MirageError::Config(format!("{field} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MirageError::Config(format!(
            "{field} must use http or https, got '{other}'"
        ))),
    }
}
