#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mirage_lib::{
    BrandServer, GenerationRequest, MirageError, ResponseFormat, Result, ScrapedPage, Scraper,
    TextModel,
};
use reqwest::StatusCode;

/// Serves a small page for every URL except those containing `fail_on`.
#[derive(Default)]
pub struct FakeScraper {
    pub fail_on: Option<String>,
    pub calls: AtomicUsize,
    pub urls: Mutex<Vec<String>>,
}

impl FakeScraper {
    pub fn failing_on(fragment: &str) -> Self {
        Self {
            fail_on: Some(fragment.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Scraper for FakeScraper {
    async fn scrape(&self, url: &str, include_screenshot: bool) -> Result<ScrapedPage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.urls.lock().unwrap().push(url.to_string());
        if let Some(fragment) = &self.fail_on {
            if url.contains(fragment.as_str()) {
                return Err(MirageError::fetch(
                    Some(StatusCode::BAD_GATEWAY),
                    format!("Firecrawl request failed (502): upstream unavailable for {url}"),
                ));
            }
        }
        Ok(ScrapedPage {
            url: url.to_string(),
            markdown: Some(format!("# Welcome to {url}\nBuild faster with us.")),
            html: Some("<h1 style=\"font-family: Inter\">Welcome</h1>".into()),
            screenshot: include_screenshot.then(|| "https://cdn.test/shot.png".to_string()),
            title: Some("Fake site".into()),
            description: None,
        })
    }
}

/// Answers brand extraction with JSON and component generation with markup.
///
/// Pages whose prompt mentions `other.test` get a second, distinct brand.
#[derive(Default)]
pub struct FakeModel {
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub const BRAND_JSON: &str = r##"{
  "colors": {"primary": "#FF5A5F", "secondary": "#00A699", "palette": ["#FF5A5F", "#00A699", "#FFFFFF"]},
  "typography": {"headings": "Circular", "body": "Helvetica", "weights": [400, 700]},
  "spacing": {"grid": "8px"},
  "buttons": {"primary": {"bg": "#FF5A5F", "text": "#FFFFFF", "borderRadius": "8px"}}
}"##;

pub const OTHER_BRAND_JSON: &str = r##"{
  "colors": {"primary": "#1DB954", "secondary": "#191414", "palette": ["#1DB954", "#191414"]},
  "typography": {"headings": "Gotham", "body": "Helvetica"},
  "buttons": {"primary": {"bg": "#1DB954", "text": "#FFFFFF", "borderRadius": "500px"}}
}"##;

const PRICING_REPLY: &str = "---HTML---\n<section class=\"pricing\">\n  <div class=\"pricing-tier\"><h3>Starter</h3><p class=\"price\">$9/mo</p><button>Choose</button></div>\n  <div class=\"pricing-tier\"><h3>Pro</h3><p class=\"price\">$29/mo</p><button>Choose</button></div>\n  <div class=\"pricing-tier\"><h3>Team</h3><p class=\"price\">$99/mo</p><button>Choose</button></div>\n</section>\n---CSS---\n.pricing { display: grid; grid-template-columns: repeat(3, 1fr); }\n---END---";

const COMPONENT_REPLY: &str = "---HTML---\n<section class=\"hero\"><h1>Hello</h1><a class=\"btn\">Start</a></section>\n---CSS---\n.hero { font-family: var(--font-heading); }\n---END---";

#[async_trait]
impl TextModel for FakeModel {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.prompt.clone());
        Ok(match request.format {
            ResponseFormat::Json if request.prompt.contains("other.test") => OTHER_BRAND_JSON,
            ResponseFormat::Json => BRAND_JSON,
            ResponseFormat::Text if request.prompt.contains("pricing table") => PRICING_REPLY,
            ResponseFormat::Text => COMPONENT_REPLY,
        }
        .to_string())
    }
}

pub struct Harness {
    pub scraper: Arc<FakeScraper>,
    pub model: Arc<FakeModel>,
    pub server: BrandServer,
}

pub fn harness_with(scraper: FakeScraper) -> Harness {
    let scraper = Arc::new(scraper);
    let model = Arc::new(FakeModel::default());
    let server = BrandServer::new(scraper.clone(), model.clone());
    Harness {
        scraper,
        model,
        server,
    }
}

pub fn harness() -> Harness {
    harness_with(FakeScraper::default())
}
