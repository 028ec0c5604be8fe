//! Quality report and batch summary types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Coarse quality bucket derived from the numeric score.
///
/// Ordered worst to best; `Invalid` is reserved for empty content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityLevel {
    Invalid,
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invalid => "invalid",
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::Excellent => "excellent",
        }
    }
}

impl fmt::Display for QualityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score and qualitative tags for one `(content, url)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityReport {
    pub url: String,
    /// Meets the minimum length and minimum score.
    pub valid: bool,
    /// Sum of the five factor sub-scores, 0–100.
    pub score: u32,
    pub level: QualityLevel,
    /// Shortfalls, in rubric order.
    pub issues: Vec<String>,
    /// Notable positives, in rubric order.
    pub strengths: Vec<String>,
    /// Length in characters.
    pub content_length: usize,
    /// Whitespace-separated word count.
    pub word_count: usize,
}

/// Aggregate over a set of [`QualityReport`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchQualitySummary {
    pub total_validated: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// `valid_count / total_validated * 100`, or 0 for an empty batch.
    pub success_rate_percent: f64,
    /// Mean score rounded to two decimals, or 0 for an empty batch.
    pub average_score: f64,
    /// Reports per level; levels with no reports are absent.
    pub level_distribution: BTreeMap<QualityLevel, usize>,
}
