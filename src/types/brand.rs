//! Brand descriptor types.
//!
//! A [`BrandDescriptor`] is the structured summary of a website's visual identity:
//! colors, typography, spacing and button styles. Descriptors are built from
//! untrusted provider output (or caller-supplied JSON), so every construction path
//! goes through [`BrandDescriptor::validate`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{MirageError, Result};

pub const DEFAULT_FONT: &str = "sans-serif";
pub const DEFAULT_WEIGHTS: [u16; 3] = [400, 600, 700];
pub const DEFAULT_GRID: &str = "8px";
pub const DEFAULT_BUTTON_RADIUS: &str = "4px";
pub const DEFAULT_BUTTON_PADDING: &str = "12px 24px";

/// Complete brand identity extracted from a website.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDescriptor {
    /// Page the brand was extracted from
    #[serde(alias = "url", alias = "source_url")]
    pub source_url: String,
    pub colors: BrandColors,
    pub typography: BrandTypography,
    #[serde(default)]
    pub spacing: BrandSpacing,
    #[serde(default)]
    pub buttons: BrandButtons,
    #[serde(default, alias = "logo_url", skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, alias = "favicon_url", skip_serializing_if = "Option::is_none")]
    pub favicon_url: Option<String>,
    /// Screenshot URLs or data, present only when requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandColors {
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub palette: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandTypography {
    pub headings: String,
    pub body: String,
    #[serde(default = "default_weights")]
    pub weights: Vec<u16>,
    #[serde(default = "default_base_size", alias = "base_size")]
    pub base_size: Option<String>,
    #[serde(default = "default_line_height", alias = "line_height")]
    pub line_height: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandSpacing {
    #[serde(default = "default_grid")]
    pub grid: String,
    #[serde(default)]
    pub margins: BTreeMap<String, String>,
    #[serde(default)]
    pub padding: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<String>,
}

impl Default for BrandSpacing {
    fn default() -> Self {
        Self {
            grid: default_grid(),
            margins: BTreeMap::new(),
            padding: BTreeMap::new(),
            gap: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandButtons {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<ButtonStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<ButtonStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<ButtonStyle>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonStyle {
    pub bg: String,
    pub text: String,
    #[serde(default = "default_button_radius", alias = "border_radius")]
    pub border_radius: String,
    #[serde(default = "default_button_padding")]
    pub padding: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default, alias = "hover_bg", skip_serializing_if = "Option::is_none")]
    pub hover_bg: Option<String>,
}

fn default_weights() -> Vec<u16> {
    DEFAULT_WEIGHTS.to_vec()
}

fn default_base_size() -> Option<String> {
    Some("16px".to_string())
}

fn default_line_height() -> Option<String> {
    Some("1.5".to_string())
}

fn default_grid() -> String {
    DEFAULT_GRID.to_string()
}

fn default_button_radius() -> String {
    DEFAULT_BUTTON_RADIUS.to_string()
}

fn default_button_padding() -> String {
    DEFAULT_BUTTON_PADDING.to_string()
}

impl BrandTypography {
    pub fn new(headings: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            headings: headings.into(),
            body: body.into(),
            weights: default_weights(),
            base_size: default_base_size(),
            line_height: default_line_height(),
        }
    }
}

impl BrandColors {
    pub fn new(primary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: None,
            accent: None,
            background: None,
            text: None,
            palette: Vec::new(),
        }
    }
}

impl BrandDescriptor {
    /// Parse a descriptor from caller-supplied JSON and validate it.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let descriptor: BrandDescriptor = serde_json::from_value(value)
            .map_err(|e| MirageError::validation(format!("brand_data is malformed: {e}")))?;
        descriptor.validate()?;
        Ok(descriptor)
    }

    pub fn validate(&self) -> Result<()> {
        if self.source_url.trim().is_empty() {
            return Err(MirageError::validation("brand sourceUrl must not be empty"));
        }
        if self.colors.primary.trim().is_empty() {
            return Err(MirageError::validation(
                "brand colors.primary must not be empty",
            ));
        }
        if let Some(idx) = self.colors.palette.iter().position(|c| c.trim().is_empty()) {
            return Err(MirageError::validation(format!(
                "brand colors.palette[{idx}] is empty"
            )));
        }
        if self.typography.headings.trim().is_empty() {
            return Err(MirageError::validation(
                "brand typography.headings must not be empty",
            ));
        }
        if self.typography.body.trim().is_empty() {
            return Err(MirageError::validation(
                "brand typography.body must not be empty",
            ));
        }
        if let Some(weight) = self
            .typography
            .weights
            .iter()
            .find(|w| **w == 0 || **w > 1000)
        {
            return Err(MirageError::validation(format!(
                "font weight {weight} is outside 1..=1000"
            )));
        }
        Ok(())
    }
}
