//! Tool facade and the MCP stdio server built on it.
//!
//! [`BrandServer`] owns the provider handles and exposes the five operations as
//! typed methods, as rmcp tool routes (see [`handler`]) and through
//! [`BrandServer::call_tool`], which takes raw JSON arguments and returns either
//! the JSON result or a structured error payload.

pub mod handler;
pub mod tools;
pub mod transport;

use rmcp::handler::server::router::tool::ToolRouter;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, info_span, warn, Instrument};

use crate::comparator::BrandComparator;
use crate::config::Config;
use crate::error::{ErrorPayload, MirageError, Result};
use crate::extractor::BrandExtractor;
use crate::generator::ReplicaGenerator;
use crate::providers::{FirecrawlClient, GeminiClient, Scraper, TextModel};
use crate::resource::parse_target_url;
use crate::templates::TemplateApplier;
use crate::types::{
    BrandComparison, BrandDescriptor, ComponentType, ReplicaArtifact, Replication,
    TemplateApplication,
};

pub use handler::{tool_definitions, SERVER_NAME};
pub use tools::TOOL_NAMES;
pub use transport::{serve, serve_stdio, MAX_MESSAGE_BYTES};

/// Stateless facade over scraping, extraction, generation and comparison.
#[derive(Clone)]
pub struct BrandServer {
    scraper: Arc<dyn Scraper>,
    extractor: BrandExtractor,
    generator: ReplicaGenerator,
    comparator: BrandComparator,
    templates: TemplateApplier,
    tool_router: ToolRouter<BrandServer>,
}

impl BrandServer {
    pub fn new(scraper: Arc<dyn Scraper>, model: Arc<dyn TextModel>) -> Self {
        let extractor = BrandExtractor::new(model.clone());
        let generator = ReplicaGenerator::new(model);
        let templates = TemplateApplier::new(scraper.clone(), extractor.clone(), generator.clone());
        Self {
            scraper,
            extractor,
            generator,
            comparator: BrandComparator::default(),
            templates,
            tool_router: handler::router(),
        }
    }

    /// Build the server with Firecrawl and Gemini clients from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let scraper = FirecrawlClient::from_config(&config.firecrawl)?;
        let model = GeminiClient::from_config(&config.gemini)?;
        info!(model = model.model(), "providers configured");
        Ok(Self::new(Arc::new(scraper), Arc::new(model)))
    }

    pub async fn extract_brand(
        &self,
        url: &str,
        include_screenshots: bool,
    ) -> Result<BrandDescriptor> {
        let target = parse_target_url(url)?;
        let page = self.scraper.scrape(target.as_str(), include_screenshots).await?;
        self.extractor.extract(&page).await
    }

    /// Generate a component from caller-supplied brand JSON.
    pub async fn generate_replica(
        &self,
        brand_data: Value,
        component_type: &str,
        customization: &str,
    ) -> Result<ReplicaArtifact> {
        let kind: ComponentType = component_type.parse()?;
        let brand = BrandDescriptor::from_value(brand_data)?;
        self.generator
            .generate_component(&brand, kind, customization)
            .await
    }

    pub async fn replicate_website(
        &self,
        url: &str,
        component_type: &str,
        customization: &str,
    ) -> Result<Replication> {
        let kind: ComponentType = component_type.parse()?;
        let brand_data = self.extract_brand(url, false).await?;
        let generated = self
            .generator
            .generate_component(&brand_data, kind, customization)
            .await?;
        Ok(Replication {
            brand_data,
            generated,
        })
    }

    /// Extract `url1` then `url2`; the first failure ends the call.
    pub async fn compare_brands(&self, url1: &str, url2: &str) -> Result<BrandComparison> {
        let site1 = self.extract_brand(url1, false).await?;
        let site2 = self.extract_brand(url2, false).await?;
        let comparison = self.comparator.compare(&site1, &site2)?;
        Ok(BrandComparison {
            site1,
            site2,
            comparison,
        })
    }

    pub async fn apply_brand_to_template(
        &self,
        url: &str,
        template_type: &str,
    ) -> Result<TemplateApplication> {
        let target = parse_target_url(url)?;
        self.templates.apply(target.as_str(), template_type).await
    }

    /// Dispatch a tool call by name with raw JSON arguments.
    ///
    /// Every failure is returned as an [`ErrorPayload`] tagged with the tool name.
    pub async fn call_tool(
        &self,
        name: &str,
        args: Value,
    ) -> std::result::Result<Value, ErrorPayload> {
        traced(name, self.dispatch(name, args)).await
    }

    async fn dispatch(&self, name: &str, args: Value) -> Result<Value> {
        match name {
            tools::EXTRACT_BRAND => {
                let args: tools::ExtractBrandArgs = tools::parse_args(name, args)?;
                to_json(self.extract_brand(&args.url, args.include_screenshots).await?)
            }
            tools::GENERATE_REPLICA => {
                let args: tools::GenerateReplicaArgs = tools::parse_args(name, args)?;
                to_json(
                    self.generate_replica(
                        args.brand_data,
                        &args.component_type,
                        &args.customization,
                    )
                    .await?,
                )
            }
            tools::REPLICATE_WEBSITE => {
                let args: tools::ReplicateWebsiteArgs = tools::parse_args(name, args)?;
                to_json(
                    self.replicate_website(&args.url, &args.component_type, &args.customization)
                        .await?,
                )
            }
            tools::COMPARE_BRANDS => {
                let args: tools::CompareBrandsArgs = tools::parse_args(name, args)?;
                to_json(self.compare_brands(&args.url1, &args.url2).await?)
            }
            tools::APPLY_BRAND_TO_TEMPLATE => {
                let args: tools::ApplyTemplateArgs = tools::parse_args(name, args)?;
                to_json(
                    self.apply_brand_to_template(&args.url, &args.template_type)
                        .await?,
                )
            }
            other => Err(MirageError::validation(format!(
                "unknown tool '{other}'; available: {}",
                TOOL_NAMES.join(", ")
            ))),
        }
    }
}

/// Run one tool call inside its span, logging the outcome and tagging failures.
async fn traced<F>(name: &str, call: F) -> std::result::Result<Value, ErrorPayload>
where
    F: Future<Output = Result<Value>>,
{
    let span = info_span!("tool", name = %name);
    async move {
        let started = Instant::now();
        match call.await {
            Ok(value) => {
                info!(elapsed_ms = started.elapsed().as_millis() as u64, "tool call succeeded");
                Ok(value)
            }
            Err(err) => {
                let payload = err.to_payload().with_operation(name);
                warn!(
                    category = ?payload.category,
                    error = %payload.message,
                    "tool call failed"
                );
                Err(payload)
            }
        }
    }
    .instrument(span)
    .await
}

fn to_json<T: Serialize>(value: T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}
