use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use std::fmt::Write as FmtWrite;
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::error::{MirageError, Result};
use crate::providers::{GenerationRequest, TextModel};
use crate::types::{BrandDescriptor, ComponentType, ReplicaArtifact};

const HTML_MARKER: &str = "---HTML---";
const CSS_MARKER: &str = "---CSS---";
const END_MARKER: &str = "---END---";

/// Generates HTML/CSS components styled with a brand.
#[derive(Clone)]
pub struct ReplicaGenerator {
    model: Arc<dyn TextModel>,
}

impl ReplicaGenerator {
    pub fn new(model: Arc<dyn TextModel>) -> Self {
        Self { model }
    }

    /// Generate a component named by a caller-supplied type string.
    ///
    /// Unknown types fail with [`MirageError::Generation`] before the model is called.
    pub async fn generate(
        &self,
        brand: &BrandDescriptor,
        component_type: &str,
        customization: &str,
    ) -> Result<ReplicaArtifact> {
        let kind: ComponentType = component_type.parse()?;
        self.generate_component(brand, kind, customization).await
    }

    #[instrument(skip(self, brand, customization), fields(component = %kind, source = %brand.source_url))]
    pub async fn generate_component(
        &self,
        brand: &BrandDescriptor,
        kind: ComponentType,
        customization: &str,
    ) -> Result<ReplicaArtifact> {
        brand.validate()?;

        let css_variables = brand_css_variables(brand);
        let request = GenerationRequest::text(build_prompt(brand, kind, customization, &css_variables));
        let completion = self
            .model
            .generate(&request)
            .await
            .map_err(MirageError::into_generation)?;

        let (html, css) = parse_generated_code(&completion);
        if html.trim().is_empty() {
            return Err(MirageError::generation(format!(
                "model output for {kind} contained no HTML"
            )));
        }
        debug!(html_chars = html.len(), css_chars = css.len(), "component generated");

        let full_css = format!(":root {{\n{css_variables}\n}}\n\n{css}");
        let preview_url = preview_data_url(&html, &full_css);
        Ok(ReplicaArtifact {
            html,
            css: full_css,
            preview_url,
            component_type: kind,
        })
    }
}

/// CSS custom properties describing the brand, one declaration per line.
pub fn brand_css_variables(brand: &BrandDescriptor) -> String {
    let mut vars = vec![format!("  --color-primary: {};", brand.colors.primary)];
    let optional = [
        ("secondary", &brand.colors.secondary),
        ("accent", &brand.colors.accent),
        ("background", &brand.colors.background),
        ("text", &brand.colors.text),
    ];
    for (name, value) in optional {
        if let Some(value) = value {
            vars.push(format!("  --color-{name}: {value};"));
        }
    }

    vars.push(format!("  --font-heading: {};", brand.typography.headings));
    vars.push(format!("  --font-body: {};", brand.typography.body));
    vars.push(format!("  --spacing-grid: {};", brand.spacing.grid));

    if let Some(button) = &brand.buttons.primary {
        vars.push(format!("  --btn-primary-bg: {};", button.bg));
        vars.push(format!("  --btn-primary-text: {};", button.text));
        vars.push(format!("  --btn-primary-radius: {};", button.border_radius));
    }

    vars.join("\n")
}

fn build_prompt(
    brand: &BrandDescriptor,
    kind: ComponentType,
    customization: &str,
    css_variables: &str,
) -> String {
    let colors = &brand.colors;
    let button = brand
        .buttons
        .primary
        .as_ref()
        .map(|b| {
            format!(
                "background {}, text {}, radius {}, padding {}",
                b.bg, b.text, b.border_radius, b.padding
            )
        })
        .unwrap_or_else(|| "Default".to_string());

    let mut prompt = String::new();
    writeln!(
        prompt,
        "Generate a {} component using these brand specifications:",
        kind.label()
    )
    .ok();
    writeln!(prompt).ok();
    writeln!(prompt, "BRAND DATA:").ok();
    writeln!(prompt, "- Primary Color: {}", colors.primary).ok();
    writeln!(prompt, "- Secondary Color: {}", colors.secondary.as_deref().unwrap_or("N/A")).ok();
    writeln!(prompt, "- Accent Color: {}", colors.accent.as_deref().unwrap_or("N/A")).ok();
    writeln!(prompt, "- Background: {}", colors.background.as_deref().unwrap_or("#ffffff")).ok();
    writeln!(prompt, "- Text Color: {}", colors.text.as_deref().unwrap_or("#000000")).ok();
    writeln!(prompt, "- Heading Font: {}", brand.typography.headings).ok();
    writeln!(prompt, "- Body Font: {}", brand.typography.body).ok();
    writeln!(prompt, "- Button Style: {button}").ok();
    writeln!(prompt).ok();
    writeln!(prompt, "CSS VARIABLES (use these):").ok();
    writeln!(prompt, ":root {{\n{css_variables}\n}}").ok();
    writeln!(prompt).ok();
    writeln!(prompt, "COMPONENT TYPE: {}", kind.as_str()).ok();
    if !customization.trim().is_empty() {
        writeln!(prompt).ok();
        writeln!(prompt, "ADDITIONAL INSTRUCTIONS: {}", customization.trim()).ok();
    }
    writeln!(prompt).ok();
    prompt.push_str(
        "REQUIREMENTS:\n\
1. Generate clean, semantic HTML5\n\
2. Generate CSS that uses the provided CSS variables\n\
3. Make the component responsive\n\
4. Use modern CSS (flexbox/grid)\n\
5. Include hover states for interactive elements\n\
\n\
OUTPUT FORMAT:\n\
Return the response in this exact format:\n\
---HTML---\n\
[Your HTML code here]\n\
---CSS---\n\
[Your CSS code here]\n\
---END---\n",
    );
    prompt
}

/// Split a completion into `(html, css)`.
///
/// Accepts the delimited `---HTML--- / ---CSS--- / ---END---` format and falls back
/// to fenced ```html / ```css blocks.
pub fn parse_generated_code(text: &str) -> (String, String) {
    if let (Some(html_at), Some(css_at)) = (text.find(HTML_MARKER), text.find(CSS_MARKER)) {
        if html_at < css_at {
            let html = &text[html_at + HTML_MARKER.len()..css_at];
            let after_css = &text[css_at + CSS_MARKER.len()..];
            let css = after_css
                .find(END_MARKER)
                .map_or(after_css, |end| &after_css[..end]);
            return (
                strip_fence(html.trim()).to_string(),
                strip_fence(css.trim()).to_string(),
            );
        }
    }

    (
        fenced_block(text, "html").unwrap_or_default(),
        fenced_block(text, "css").unwrap_or_default(),
    )
}

fn fenced_block(text: &str, lang: &str) -> Option<String> {
    let opener = format!("```{lang}");
    let start = text.find(&opener)? + opener.len();
    let rest = &text[start..];
    let end = rest.find("```").unwrap_or(rest.len());
    Some(rest[..end].trim().to_string())
}

/// Models sometimes fence code inside the delimited sections too.
fn strip_fence(section: &str) -> &str {
    crate::extractor::strip_code_fences(section)
}

/// A standalone HTML document embedding the artifact, as a base64 data URL.
pub fn preview_data_url(html: &str, css: &str) -> String {
    let document = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"UTF-8\">\n    \
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
<style>{css}</style>\n</head>\n<body>\n{html}\n</body>\n</html>"
    );
    format!(
        "data:text/html;base64,{}",
        BASE64_STANDARD.encode(document.as_bytes())
    )
}
