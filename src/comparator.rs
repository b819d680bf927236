use palette::{convert::FromColorUnclamped, Lab, Srgb};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::types::{BrandDescriptor, ComparisonResult};

/// Euclidean distance between black and white in 8-bit RGB space.
const MAX_RGB_DISTANCE: f64 = 441.672_955_930_064;

/// Compares two brand descriptors without any external calls.
#[derive(Debug, Clone, Copy)]
pub struct BrandComparator {
    /// Lab distance at which two palette colors stop counting as a match.
    pub delta_e_tolerance: f32,
}

impl Default for BrandComparator {
    fn default() -> Self {
        Self {
            delta_e_tolerance: 25.0,
        }
    }
}

impl BrandComparator {
    pub fn compare(&self, a: &BrandDescriptor, b: &BrandDescriptor) -> Result<ComparisonResult> {
        a.validate()?;
        b.validate()?;

        let heading_a = normalize_font(&a.typography.headings);
        let heading_b = normalize_font(&b.typography.headings);
        let body_a = normalize_font(&a.typography.body);
        let body_b = normalize_font(&b.typography.body);

        let fonts_a: BTreeSet<String> = [heading_a.clone(), body_a.clone()].into();
        let fonts_b: BTreeSet<String> = [heading_b.clone(), body_b.clone()].into();
        let font_overlap = fonts_a.intersection(&fonts_b).cloned().collect();

        Ok(ComparisonResult {
            color_similarity: color_similarity(&a.colors.primary, &b.colors.primary),
            palette_similarity: self.palette_similarity(a, b),
            typography_match: heading_a == heading_b || body_a == body_b,
            font_overlap,
            differences: differences(a, b),
        })
    }

    fn palette_similarity(&self, a: &BrandDescriptor, b: &BrandDescriptor) -> f64 {
        let list_a = palette_or_primary(a);
        let list_b = palette_or_primary(b);

        let same = list_a.len() == list_b.len()
            && list_a
                .iter()
                .zip(&list_b)
                .all(|(x, y)| same_color_text(x, y));
        if same {
            return 1.0;
        }

        let labs_a: Vec<Lab> = list_a.iter().filter_map(|c| parse_color(c)).map(to_lab).collect();
        let labs_b: Vec<Lab> = list_b.iter().filter_map(|c| parse_color(c)).map(to_lab).collect();
        if labs_a.is_empty() || labs_b.is_empty() {
            return 0.0;
        }

        let forward = best_match_score(&labs_a, &labs_b, self.delta_e_tolerance);
        let backward = best_match_score(&labs_b, &labs_a, self.delta_e_tolerance);
        round3(f64::from((forward + backward) / 2.0))
    }
}

/// Similarity of two colors from their RGB distance, rounded to 3 decimals.
///
/// Equal spellings score 1.0 even when unparseable; other unparseable pairs score 0.0.
pub fn color_similarity(a: &str, b: &str) -> f64 {
    if same_color_text(a, b) {
        return 1.0;
    }
    match (parse_color(a), parse_color(b)) {
        (Some(x), Some(y)) => {
            let dr = f64::from(x.red) - f64::from(y.red);
            let dg = f64::from(x.green) - f64::from(y.green);
            let db = f64::from(x.blue) - f64::from(y.blue);
            let distance = (dr * dr + dg * dg + db * db).sqrt();
            round3(1.0 - distance / MAX_RGB_DISTANCE)
        }
        _ => 0.0,
    }
}

/// Parse `#rgb`, `#rrggbb`, `rgb()/rgba()` or a CSS color name.
pub fn parse_color(value: &str) -> Option<Srgb<u8>> {
    let v = value.trim().to_ascii_lowercase();
    if v.is_empty() {
        return None;
    }

    if let Some(args) = v
        .strip_prefix("rgba(")
        .or_else(|| v.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels: Vec<u8> = args
            .split([',', ' ', '/'])
            .filter(|part| !part.is_empty())
            .take(3)
            .filter_map(|part| part.trim().parse::<f32>().ok())
            .map(|c| c.clamp(0.0, 255.0).round() as u8)
            .collect();
        return match channels[..] {
            [r, g, b] => Some(Srgb::new(r, g, b)),
            _ => None,
        };
    }

    let hex = v.strip_prefix('#').unwrap_or(&v);
    if matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return hex.parse::<Srgb<u8>>().ok();
    }

    palette::named::from_str(&v)
}

fn to_lab(color: Srgb<u8>) -> Lab {
    Lab::from_color_unclamped(color.into_format::<f32>())
}

fn lab_distance(a: Lab, b: Lab) -> f32 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    (dl * dl + da * da + db * db).sqrt()
}

fn best_match_score(from: &[Lab], to: &[Lab], tolerance: f32) -> f32 {
    let total: f32 = from
        .iter()
        .map(|lab| {
            let delta = to
                .iter()
                .map(|other| lab_distance(*lab, *other))
                .fold(f32::INFINITY, f32::min);
            1.0 - (delta / tolerance).min(1.0)
        })
        .sum();
    total / from.len() as f32
}

fn palette_or_primary(brand: &BrandDescriptor) -> Vec<String> {
    if brand.colors.palette.is_empty() {
        vec![brand.colors.primary.clone()]
    } else {
        brand.colors.palette.clone()
    }
}

fn same_color_text(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn normalize_font(font: &str) -> String {
    font.trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}

fn round3(value: f64) -> f64 {
    ((value * 1000.0).round() / 1000.0).clamp(0.0, 1.0)
}

fn differences(a: &BrandDescriptor, b: &BrandDescriptor) -> Vec<String> {
    let mut diffs = Vec::new();

    if !same_color_text(&a.colors.primary, &b.colors.primary) {
        diffs.push(format!(
            "Primary color: {} vs {}",
            a.colors.primary, b.colors.primary
        ));
    }
    if let (Some(x), Some(y)) = (&a.colors.secondary, &b.colors.secondary) {
        if !same_color_text(x, y) {
            diffs.push(format!("Secondary color: {x} vs {y}"));
        }
    }
    if normalize_font(&a.typography.headings) != normalize_font(&b.typography.headings) {
        diffs.push(format!(
            "Heading font: {} vs {}",
            a.typography.headings, b.typography.headings
        ));
    }
    if normalize_font(&a.typography.body) != normalize_font(&b.typography.body) {
        diffs.push(format!(
            "Body font: {} vs {}",
            a.typography.body, b.typography.body
        ));
    }
    if let (Some(x), Some(y)) = (&a.buttons.primary, &b.buttons.primary) {
        if x.border_radius.trim() != y.border_radius.trim() {
            diffs.push(format!(
                "Button radius: {} vs {}",
                x.border_radius, y.border_radius
            ));
        }
    }

    diffs
}
