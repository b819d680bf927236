//! Brand inference from scraped page content.
//!
//! The model is asked for a JSON object with a fixed shape. Its answer is treated
//! as untrusted input: code fences are stripped, every field is optional on the
//! wire, defaults are filled in, and the resulting [`BrandDescriptor`] must pass
//! validation before it leaves this module.

use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{MirageError, Result};
use crate::providers::{GenerationRequest, TextModel};
use crate::types::brand::{
    DEFAULT_BUTTON_PADDING, DEFAULT_BUTTON_RADIUS, DEFAULT_FONT, DEFAULT_GRID, DEFAULT_WEIGHTS,
};
use crate::types::{
    BrandButtons, BrandColors, BrandDescriptor, BrandSpacing, BrandTypography, ButtonStyle,
    ScrapedPage,
};

pub const MAX_CONTENT_CHARS: usize = 12_000;
/// Cap on the raw markup excerpt sent after the markdown.
const HTML_EXCERPT_CHARS: usize = 4_000;

const SYSTEM_PROMPT: &str = "You are a meticulous brand designer. You read website content and \
infer its visual identity. Answer with a single JSON object and nothing else.";

const RESPONSE_SHAPE: &str = r##"{
  "colors": {
    "primary": "#RRGGBB",
    "secondary": "#RRGGBB or null",
    "accent": "#RRGGBB or null",
    "background": "#RRGGBB or null",
    "text": "#RRGGBB or null",
    "palette": ["#RRGGBB", "..."]
  },
  "typography": {
    "headings": "font family for headings",
    "body": "font family for body text",
    "weights": [400, 600, 700],
    "baseSize": "16px",
    "lineHeight": "1.5"
  },
  "spacing": {
    "grid": "8px",
    "margins": {"sm": "8px", "md": "16px", "lg": "24px"},
    "padding": {"sm": "8px", "md": "16px", "lg": "24px"},
    "gap": "16px or null"
  },
  "buttons": {
    "primary": {"bg": "#RRGGBB", "text": "#RRGGBB", "borderRadius": "4px", "padding": "12px 24px", "border": null, "hoverBg": null},
    "secondary": null,
    "outline": null
  },
  "logoUrl": "absolute URL or null",
  "faviconUrl": "absolute URL or null"
}"##;

/// Infers a [`BrandDescriptor`] from a [`ScrapedPage`] using a text model.
#[derive(Clone)]
pub struct BrandExtractor {
    model: Arc<dyn TextModel>,
}

impl BrandExtractor {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    #[instrument(skip(self, page), fields(url = %page.url))]
    pub async fn extract(&self, page: &ScrapedPage) -> Result<BrandDescriptor> {
        if !page.has_content() {
            return Err(MirageError::extraction(format!(
                "page {} has no content to analyse",
                page.url
            )));
        }

        let request = GenerationRequest::json(build_prompt(page, MAX_CONTENT_CHARS))
            .with_system(SYSTEM_PROMPT);
        let completion = self
            .model
            .generate(&request)
            .await
            .map_err(MirageError::into_extraction)?;

        let mut brand = parse_brand_response(&page.url, &completion)?;
        if let Some(shot) = page.screenshot.as_ref().filter(|s| !s.trim().is_empty()) {
            brand.screenshots.push(shot.clone());
        }
        debug!(
            primary = %brand.colors.primary,
            headings = %brand.typography.headings,
            palette = brand.colors.palette.len(),
            "brand extracted"
        );
        Ok(brand)
    }
}

pub fn build_prompt(page: &ScrapedPage, max_content_chars: usize) -> String {
    let mut prompt = String::new();
    writeln!(
        prompt,
        "Extract the brand identity of the website below: colors (hex values), typography \
(font families for headings and body text, weights), spacing scale and button styles."
    )
    .ok();
    writeln!(prompt).ok();
    writeln!(prompt, "URL: {}", page.url).ok();
    if let Some(title) = &page.title {
        writeln!(prompt, "Title: {title}").ok();
    }
    if let Some(description) = &page.description {
        writeln!(prompt, "Description: {description}").ok();
    }

    if let Some(md) = page.markdown.as_deref().filter(|m| !m.trim().is_empty()) {
        push_excerpt(&mut prompt, "MARKDOWN", md, max_content_chars);
    }
    if let Some(html) = page.html.as_deref().filter(|h| !h.trim().is_empty()) {
        push_excerpt(&mut prompt, "HTML", html, max_content_chars.min(HTML_EXCERPT_CHARS));
    }
    writeln!(prompt).ok();
    writeln!(
        prompt,
        "Respond with JSON in exactly this shape. Use null for unknown optional values; \
never invent a font that is not suggested by the content, fall back to a generic family instead."
    )
    .ok();
    prompt.push_str(RESPONSE_SHAPE);
    prompt
}

fn push_excerpt(prompt: &mut String, label: &str, content: &str, max_chars: usize) {
    let (excerpt, truncated) = truncate_chars(content, max_chars);
    writeln!(prompt).ok();
    writeln!(
        prompt,
        "PAGE {label}{}:",
        if truncated { " (truncated)" } else { "" }
    )
    .ok();
    writeln!(prompt, "{excerpt}").ok();
}

fn truncate_chars(text: &str, max: usize) -> (&str, bool) {
    match text.char_indices().nth(max) {
        Some((idx, _)) => (&text[..idx], true),
        None => (text, false),
    }
}

/// Strip a surrounding Markdown code fence (```json ... ```) if present.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Parse a model completion into a validated descriptor for `source_url`.
pub fn parse_brand_response(source_url: &str, completion: &str) -> Result<BrandDescriptor> {
    let json = strip_code_fences(completion);
    let value: Value = serde_json::from_str(json)
        .map_err(|e| MirageError::extraction(format!("model output is not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(MirageError::extraction(
            "model output is not a JSON object",
        ));
    }
    let raw: RawBrand = serde_json::from_value(value).map_err(|e| {
        MirageError::extraction(format!("model output has an unexpected shape: {e}"))
    })?;

    let brand = raw.into_descriptor(source_url)?;
    brand
        .validate()
        .map_err(|e| MirageError::extraction(format!("model output failed validation: {e}")))?;
    Ok(brand)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawBrand {
    colors: Option<RawColors>,
    typography: Option<RawTypography>,
    spacing: Option<RawSpacing>,
    buttons: Option<RawButtons>,
    #[serde(alias = "logo_url")]
    logo_url: Option<String>,
    #[serde(alias = "favicon_url")]
    favicon_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawColors {
    primary: Option<String>,
    secondary: Option<String>,
    accent: Option<String>,
    background: Option<String>,
    text: Option<String>,
    palette: Option<Vec<Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawTypography {
    headings: Option<String>,
    body: Option<String>,
    weights: Option<Vec<Value>>,
    #[serde(alias = "base_size")]
    base_size: Option<String>,
    #[serde(alias = "line_height")]
    line_height: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSpacing {
    grid: Option<Value>,
    margins: Option<BTreeMap<String, Value>>,
    padding: Option<BTreeMap<String, Value>>,
    gap: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawButtons {
    primary: Option<RawButton>,
    secondary: Option<RawButton>,
    outline: Option<RawButton>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawButton {
    bg: Option<String>,
    text: Option<String>,
    #[serde(alias = "border_radius")]
    border_radius: Option<Value>,
    padding: Option<Value>,
    border: Option<String>,
    #[serde(alias = "hover_bg")]
    hover_bg: Option<String>,
}

impl RawBrand {
    fn into_descriptor(self, source_url: &str) -> Result<BrandDescriptor> {
        let raw_colors = self.colors.unwrap_or_default();
        let raw_typography = self.typography.unwrap_or_default();
        let raw_spacing = self.spacing.unwrap_or_default();
        let raw_buttons = self.buttons.unwrap_or_default();

        let palette: Vec<String> = raw_colors
            .palette
            .unwrap_or_default()
            .iter()
            .filter_map(scalar_text)
            .collect();

        let primary = non_blank(raw_colors.primary)
            .or_else(|| palette.first().cloned())
            .ok_or_else(|| MirageError::extraction("model output has no primary color"))?;

        let colors = BrandColors {
            primary: primary.clone(),
            secondary: non_blank(raw_colors.secondary),
            accent: non_blank(raw_colors.accent),
            background: non_blank(raw_colors.background),
            text: non_blank(raw_colors.text),
            palette,
        };

        let weights: Vec<u16> = raw_typography
            .weights
            .unwrap_or_default()
            .iter()
            .filter_map(weight)
            .collect();
        let typography = BrandTypography {
            headings: non_blank(raw_typography.headings).unwrap_or_else(|| DEFAULT_FONT.into()),
            body: non_blank(raw_typography.body).unwrap_or_else(|| DEFAULT_FONT.into()),
            weights: if weights.is_empty() {
                DEFAULT_WEIGHTS.to_vec()
            } else {
                weights
            },
            base_size: non_blank(raw_typography.base_size).or_else(|| Some("16px".into())),
            line_height: raw_typography
                .line_height
                .as_ref()
                .and_then(scalar_text)
                .or_else(|| Some("1.5".into())),
        };

        let spacing = BrandSpacing {
            grid: raw_spacing
                .grid
                .as_ref()
                .and_then(scalar_text)
                .unwrap_or_else(|| DEFAULT_GRID.into()),
            margins: scalar_map(raw_spacing.margins.unwrap_or_default()),
            padding: scalar_map(raw_spacing.padding.unwrap_or_default()),
            gap: raw_spacing.gap.as_ref().and_then(scalar_text),
        };

        let buttons = BrandButtons {
            primary: raw_buttons.primary.map(|b| b.into_style(&primary)),
            secondary: raw_buttons.secondary.map(|b| b.into_style(&primary)),
            outline: raw_buttons.outline.map(|b| b.into_style(&primary)),
        };

        Ok(BrandDescriptor {
            source_url: source_url.to_string(),
            colors,
            typography,
            spacing,
            buttons,
            logo_url: non_blank(self.logo_url),
            favicon_url: non_blank(self.favicon_url),
            screenshots: Vec::new(),
        })
    }
}

impl RawButton {
    fn into_style(self, primary: &str) -> ButtonStyle {
        ButtonStyle {
            bg: non_blank(self.bg).unwrap_or_else(|| primary.to_string()),
            text: non_blank(self.text).unwrap_or_else(|| "#ffffff".to_string()),
            border_radius: self
                .border_radius
                .as_ref()
                .and_then(scalar_text)
                .unwrap_or_else(|| DEFAULT_BUTTON_RADIUS.into()),
            padding: self
                .padding
                .as_ref()
                .and_then(scalar_text)
                .unwrap_or_else(|| DEFAULT_BUTTON_PADDING.into()),
            border: non_blank(self.border),
            hover_bg: non_blank(self.hover_bg),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("null"))
}

/// Models sometimes answer `8` where `"8px"` was asked for; keep both as text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(Some(s.clone())),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn scalar_map(map: BTreeMap<String, Value>) -> BTreeMap<String, String> {
    map.into_iter()
        .filter_map(|(k, v)| scalar_text(&v).map(|text| (k, text)))
        .collect()
}

fn weight(value: &Value) -> Option<u16> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|w| u16::try_from(w).ok()),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "regular" => Some(400),
            "medium" => Some(500),
            "semibold" => Some(600),
            "bold" => Some(700),
            other => other.parse().ok(),
        },
        _ => None,
    };
    parsed.filter(|w| (1..=1000).contains(w))
}
