//! Generated artifact types and the fixed component/template vocabularies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::brand::BrandDescriptor;
use crate::error::MirageError;

/// Kinds of component the replica generator knows how to ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    LandingPage,
    Email,
    Button,
    Card,
    HeroSection,
    PricingTable,
    FeatureGrid,
    Testimonial,
    Cta,
}

impl ComponentType {
    pub const ALL: [ComponentType; 9] = [
        ComponentType::LandingPage,
        ComponentType::Email,
        ComponentType::Button,
        ComponentType::Card,
        ComponentType::HeroSection,
        ComponentType::PricingTable,
        ComponentType::FeatureGrid,
        ComponentType::Testimonial,
        ComponentType::Cta,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::LandingPage => "landing_page",
            ComponentType::Email => "email",
            ComponentType::Button => "button",
            ComponentType::Card => "card",
            ComponentType::HeroSection => "hero_section",
            ComponentType::PricingTable => "pricing_table",
            ComponentType::FeatureGrid => "feature_grid",
            ComponentType::Testimonial => "testimonial",
            ComponentType::Cta => "cta",
        }
    }

    /// Human-readable label used in prompts.
    pub fn label(&self) -> &'static str {
        match self {
            ComponentType::LandingPage => "landing page",
            ComponentType::Email => "HTML email",
            ComponentType::Button => "button set",
            ComponentType::Card => "content card",
            ComponentType::HeroSection => "hero section",
            ComponentType::PricingTable => "pricing table",
            ComponentType::FeatureGrid => "feature grid",
            ComponentType::Testimonial => "testimonial section",
            ComponentType::Cta => "call-to-action section",
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = MirageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        ComponentType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                MirageError::generation(format!(
                    "unrecognized component type '{s}'; supported: {}",
                    ComponentType::ALL
                        .iter()
                        .map(ComponentType::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })
    }
}

/// Template skeletons that can be styled with an extracted brand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateType {
    HeroSection,
    PricingTable,
    FeatureGrid,
    Testimonial,
    Cta,
}

impl TemplateType {
    pub const ALL: [TemplateType; 5] = [
        TemplateType::HeroSection,
        TemplateType::PricingTable,
        TemplateType::FeatureGrid,
        TemplateType::Testimonial,
        TemplateType::Cta,
    ];

    pub fn as_str(&self) -> &'static str {
        self.component_type().as_str()
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            TemplateType::HeroSection => ComponentType::HeroSection,
            TemplateType::PricingTable => ComponentType::PricingTable,
            TemplateType::FeatureGrid => ComponentType::FeatureGrid,
            TemplateType::Testimonial => ComponentType::Testimonial,
            TemplateType::Cta => ComponentType::Cta,
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = MirageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        TemplateType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                MirageError::validation(format!(
                    "unknown template type '{s}'; supported: hero_section, pricing_table, feature_grid, testimonial, cta"
                ))
            })
    }
}

/// Generated HTML/CSS plus a self-contained preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicaArtifact {
    pub html: String,
    pub css: String,
    /// `data:text/html;base64,...` document embedding html and css
    pub preview_url: String,
    pub component_type: ComponentType,
}

/// Response of `replicate_website`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Replication {
    pub brand_data: BrandDescriptor,
    pub generated: ReplicaArtifact,
}

/// Response of `apply_brand_to_template`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateApplication {
    pub html: String,
    pub css: String,
    pub preview_url: String,
    pub template_type: TemplateType,
    pub source_url: String,
}
