use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::{error_message, Scraper};
use crate::config::{FirecrawlConfig, DEFAULT_FIRECRAWL_URL};
use crate::error::{MirageError, Result};
use crate::resource::parse_target_url;
use crate::types::ScrapedPage;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
const PROVIDER: &str = "Firecrawl";

/// Client for the Firecrawl v1 scrape endpoint.
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    http: Client,
    api_key: String,
    base_url: Url,
}

impl FirecrawlClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url_and_timeout(api_key, DEFAULT_FIRECRAWL_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_base_url_and_timeout(
        api_key: impl Into<String>,
        base_url: impl AsRef<str>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(MirageError::Config("FIRECRAWL_API_KEY is required".into()));
        }

        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| MirageError::Config(format!("invalid Firecrawl base URL: {e}")))?;

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MirageError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url,
        })
    }

    pub fn from_config(config: &FirecrawlConfig) -> Result<Self> {
        let key = config.api_key.clone().unwrap_or_default();
        Self::with_base_url_and_timeout(key, &config.base_url, config.timeout)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| MirageError::Config(format!("invalid Firecrawl endpoint: {e}")))
    }

    async fn send_scrape(&self, payload: &ScrapeRequest<'_>) -> Result<ScrapeResponse> {
        let url = self.endpoint("/v1/scrape")?;
        debug!(endpoint = %url, page = payload.url, formats = ?payload.formats, "firecrawl scrape");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| MirageError::fetch(e.status(), transport_message(&e)))?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), bytes = body.len(), "firecrawl response");

        if !status.is_success() {
            warn!(status = status.as_u16(), "firecrawl rejected scrape request");
            return Err(MirageError::fetch(
                Some(status),
                error_message(PROVIDER, status, &body, retry_after.as_deref()),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            MirageError::fetch(
                Some(status),
                format!("unexpected Firecrawl response body: {e}"),
            )
        })
    }
}

#[async_trait]
impl Scraper for FirecrawlClient {
    async fn scrape(&self, url: &str, include_screenshot: bool) -> Result<ScrapedPage> {
        let target = parse_target_url(url)?;
        let mut formats = vec!["markdown", "html"];
        if include_screenshot {
            formats.push("screenshot");
        }
        let payload = ScrapeRequest {
            url: target.as_str(),
            formats,
            only_main_content: false,
        };

        let response = self.send_scrape(&payload).await?;
        into_page(target.as_str(), response)
    }
}

fn transport_message(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request to {PROVIDER} timed out: {err}")
    } else if err.is_connect() {
        format!("could not connect to {PROVIDER}: {err}")
    } else {
        err.to_string()
    }
}

fn into_page(requested: &str, response: ScrapeResponse) -> Result<ScrapedPage> {
    if !response.success {
        let message = response
            .error
            .unwrap_or_else(|| format!("{PROVIDER} reported an unsuccessful scrape"));
        return Err(MirageError::fetch(None, message));
    }

    let data = response
        .data
        .ok_or_else(|| MirageError::fetch(None, "Firecrawl response is missing data"))?;

    if let Some(code) = data.metadata.status_code.filter(|c| *c >= 400) {
        let detail = data
            .metadata
            .error
            .clone()
            .unwrap_or_else(|| "target page returned an error".to_string());
        let message = format!("{requested} responded with status {code}: {detail}");
        return Err(match StatusCode::from_u16(code) {
            Ok(status) => MirageError::target_page(status, message),
            Err(_) => MirageError::fetch(None, message),
        });
    }

    let page = ScrapedPage {
        url: data
            .metadata
            .source_url
            .clone()
            .unwrap_or_else(|| requested.to_string()),
        markdown: data.markdown,
        html: data.html,
        screenshot: data.screenshot,
        title: first_text(data.metadata.title.as_ref()),
        description: first_text(data.metadata.description.as_ref()),
    };

    if !page.has_content() {
        return Err(MirageError::fetch(
            None,
            format!("{PROVIDER} returned no content for {requested}"),
        ));
    }
    Ok(page)
}

/// Metadata fields are occasionally arrays when a page repeats a meta tag.
fn first_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(|v| v.as_str().map(str::to_owned)),
        _ => None,
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: Vec<&'static str>,
    only_main_content: bool,
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<ScrapeData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    #[serde(default)]
    markdown: Option<String>,
    #[serde(default)]
    html: Option<String>,
    #[serde(default)]
    screenshot: Option<String>,
    #[serde(default)]
    metadata: ScrapeMetadata,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeMetadata {
    #[serde(default)]
    title: Option<Value>,
    #[serde(default)]
    description: Option<Value>,
    #[serde(default, rename = "sourceURL")]
    source_url: Option<String>,
    #[serde(default)]
    status_code: Option<u16>,
    #[serde(default)]
    error: Option<String>,
}
