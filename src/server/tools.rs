//! Tool names and argument types. Input schemas are derived from the argument structs.

use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;

use crate::error::{MirageError, Result};
use crate::types::ComponentType;

pub const EXTRACT_BRAND: &str = "extract_brand";
pub const GENERATE_REPLICA: &str = "generate_replica";
pub const REPLICATE_WEBSITE: &str = "replicate_website";
pub const COMPARE_BRANDS: &str = "compare_brands";
pub const APPLY_BRAND_TO_TEMPLATE: &str = "apply_brand_to_template";

pub const TOOL_NAMES: [&str; 5] = [
    EXTRACT_BRAND,
    GENERATE_REPLICA,
    REPLICATE_WEBSITE,
    COMPARE_BRANDS,
    APPLY_BRAND_TO_TEMPLATE,
];

fn default_component_type() -> String {
    ComponentType::LandingPage.as_str().to_string()
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExtractBrandArgs {
    /// Website URL to analyse
    pub url: String,
    /// Capture a screenshot of the page
    #[serde(default)]
    pub include_screenshots: bool,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GenerateReplicaArgs {
    /// Brand descriptor as returned by extract_brand
    pub brand_data: Value,
    /// One of landing_page, email, button, card, hero_section, pricing_table,
    /// feature_grid, testimonial, cta
    #[serde(default = "default_component_type")]
    pub component_type: String,
    /// Additional instructions for the component
    #[serde(default)]
    pub customization: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ReplicateWebsiteArgs {
    /// Website URL to replicate
    pub url: String,
    /// Component to generate, as for generate_replica
    #[serde(default = "default_component_type")]
    pub component_type: String,
    #[serde(default)]
    pub customization: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CompareBrandsArgs {
    pub url1: String,
    pub url2: String,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ApplyTemplateArgs {
    /// Website URL whose brand is applied
    pub url: String,
    /// One of hero_section, pricing_table, feature_grid, testimonial, cta
    pub template_type: String,
}

/// Decode tool arguments; a missing argument object counts as `{}`.
pub fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T> {
    let args = match args {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    if !args.is_object() {
        return Err(MirageError::validation(format!(
            "arguments for {tool} must be a JSON object"
        )));
    }
    serde_json::from_value(args)
        .map_err(|e| MirageError::validation(format!("invalid arguments for {tool}: {e}")))
}
