//! Mirage Library
//!
//! Extracts a website's brand identity (colors, typography, spacing, buttons)
//! through a scraping provider and a generative model, then uses it to generate
//! matching HTML/CSS components, compare brands and fill page templates.
//!
//! # Module Overview
//!
//! - [`providers`] - Firecrawl scraper and Gemini model clients behind traits
//! - [`extractor`] - page content to [`BrandDescriptor`]
//! - [`generator`] - [`BrandDescriptor`] to HTML/CSS [`ReplicaArtifact`]
//! - [`comparator`] - deterministic similarity between two descriptors
//! - [`templates`] - brand applied to fixed template skeletons
//! - [`server`] - tool facade and MCP stdio server
//! - [`config`] - configuration file and environment support
//! - [`types`] - core data types
//!
//! # Example
//!
//! ```no_run
//! use mirage_lib::{BrandServer, Config};
//!
//! # async fn example() -> mirage_lib::Result<()> {
//! let config = Config::load(None)?.with_env_overrides();
//! config.validate()?;
//! let server = BrandServer::from_config(&config)?;
//!
//! let brand = server.extract_brand("https://example.com", false).await?;
//! let replica = server
//!     .generate_replica(serde_json::to_value(&brand)?, "hero_section", "")
//!     .await?;
//! println!("{}", replica.preview_url);
//! # Ok(())
//! # }
//! ```

pub mod comparator;
pub mod config;
pub mod error;
pub mod extractor;
pub mod generator;
pub mod providers;
pub mod resource;
pub mod server;
pub mod templates;
pub mod types;

pub use comparator::{color_similarity, parse_color, BrandComparator};
pub use config::{Config, FirecrawlConfig, GeminiConfig};
pub use error::{ErrorCategory, ErrorPayload, MirageError, Result};
pub use extractor::BrandExtractor;
pub use generator::{brand_css_variables, parse_generated_code, preview_data_url, ReplicaGenerator};
pub use providers::{
    FirecrawlClient, GeminiClient, GenerationRequest, ResponseFormat, Scraper, TextModel,
};
pub use resource::{parse_target_url, TargetParseError};
pub use server::BrandServer;
pub use templates::{template_prompt, TemplateApplier};
pub use types::{
    BrandButtons, BrandColors, BrandComparison, BrandDescriptor, BrandSpacing, BrandTypography,
    ButtonStyle, ComparisonResult, ComponentType, ReplicaArtifact, Replication, ScrapedPage,
    TemplateApplication, TemplateType,
};
