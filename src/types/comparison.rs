use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::brand::BrandDescriptor;

/// Similarity scores and differences between two brand descriptors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    /// Primary color similarity (0.0 - 1.0)
    pub color_similarity: f64,
    /// Whole-palette similarity in Lab space (0.0 - 1.0)
    pub palette_similarity: f64,
    pub typography_match: bool,
    pub font_overlap: BTreeSet<String>,
    #[serde(default)]
    pub differences: Vec<String>,
}

/// Response of `compare_brands`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandComparison {
    pub site1: BrandDescriptor,
    pub site2: BrandDescriptor,
    pub comparison: ComparisonResult,
}
