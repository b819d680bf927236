//! Core types used throughout the Mirage library.
//!
//! - [`BrandDescriptor`] - extracted visual identity
//! - [`ScrapedPage`] - raw page content from the scraping provider
//! - [`ReplicaArtifact`] - generated HTML/CSS with preview
//! - [`ComparisonResult`] - similarity between two descriptors

pub mod brand;
pub mod comparison;
pub mod page;
pub mod replica;

pub use brand::{BrandButtons, BrandColors, BrandDescriptor, BrandSpacing, BrandTypography, ButtonStyle};
pub use comparison::{BrandComparison, ComparisonResult};
pub use page::ScrapedPage;
pub use replica::{ComponentType, ReplicaArtifact, Replication, TemplateApplication, TemplateType};
