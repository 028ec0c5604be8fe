//! Declarative scoring rubric.
//!
//! Each factor is a table of `(minimum, points, strength)` tiers checked
//! top-down; the first tier the measured count reaches wins. A count below
//! every tier scores zero and records the factor's shortfall issue. Source
//! trust is categorical and always scores.

use std::sync::LazyLock;

use regex::Regex;

use crate::report::QualityLevel;

// ---------------------------------------------------------------------------
// Count-based factors
// ---------------------------------------------------------------------------

/// One threshold row of a count-based factor.
#[derive(Debug, Clone, Copy)]
pub struct Tier {
    pub min: usize,
    pub points: u32,
    pub strength: Option<&'static str>,
}

/// A factor scored by comparing a count against descending tiers.
#[derive(Debug, Clone, Copy)]
pub struct CountFactor {
    pub name: &'static str,
    pub cap: u32,
    pub tiers: &'static [Tier],
    pub shortfall: &'static str,
}

/// Outcome of scoring one factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorScore {
    pub points: u32,
    pub strength: Option<&'static str>,
    pub issue: Option<&'static str>,
}

impl CountFactor {
    pub fn score(&self, count: usize) -> FactorScore {
        match self.tiers.iter().find(|tier| count >= tier.min) {
            Some(tier) => FactorScore {
                points: tier.points.min(self.cap),
                strength: tier.strength,
                issue: None,
            },
            None => FactorScore {
                points: 0,
                strength: None,
                issue: Some(self.shortfall),
            },
        }
    }
}

/// Character length.
pub const LENGTH: CountFactor = CountFactor {
    name: "length",
    cap: 25,
    tiers: &[
        Tier { min: 2000, points: 25, strength: Some("extensive content") },
        Tier { min: 1000, points: 20, strength: Some("substantial content") },
        Tier { min: 500, points: 15, strength: None },
        Tier { min: 100, points: 10, strength: None },
    ],
    shortfall: "content too short",
};

/// Whitespace-separated word count.
pub const WORD_DENSITY: CountFactor = CountFactor {
    name: "word_density",
    cap: 25,
    tiers: &[
        Tier { min: 300, points: 25, strength: Some("high word density") },
        Tier { min: 150, points: 20, strength: None },
        Tier { min: 75, points: 15, strength: None },
    ],
    shortfall: "low word density",
};

/// Matches across [`DATA_PATTERNS`].
pub const STRUCTURED_DATA: CountFactor = CountFactor {
    name: "structured_data",
    cap: 20,
    tiers: &[
        Tier { min: 10, points: 20, strength: Some("rich in numeric data") },
        Tier { min: 5, points: 15, strength: None },
        Tier { min: 2, points: 10, strength: None },
    ],
    shortfall: "little structured data",
};

/// Relevance keyword occurrences in the lowercased text.
pub const RELEVANCE: CountFactor = CountFactor {
    name: "relevance",
    cap: 15,
    tiers: &[
        Tier { min: 8, points: 15, strength: Some("highly relevant") },
        Tier { min: 5, points: 12, strength: None },
        Tier { min: 3, points: 8, strength: None },
    ],
    shortfall: "low topical relevance",
};

// ---------------------------------------------------------------------------
// Structured data patterns
// ---------------------------------------------------------------------------

/// Percentages, currency amounts, scaled quantities, recent years, counted entities.
pub static DATA_PATTERNS: LazyLock<[Regex; 5]> = LazyLock::new(|| {
    [
        r"\d+%",
        r"(?:R\$|US\$|€|£|\$)\s*\d[\d,.]*",
        r"(?i)\d+\s*(?:mil|milhão|milhões|bilhão|bilhões|thousand|million|billion)",
        r"20(?:2[3-9]|[3-9]\d)",
        r"(?i)\d+\s*(?:empresas|clientes|usuários|companies|customers|clients|users)",
    ]
    .map(|p| Regex::new(p).expect("valid regex"))
});

/// Non-overlapping matches summed over every data pattern.
pub fn count_data_matches(content: &str) -> usize {
    DATA_PATTERNS
        .iter()
        .map(|re| re.find_iter(content).count())
        .sum()
}

// ---------------------------------------------------------------------------
// Source trust
// ---------------------------------------------------------------------------

/// Cap for the categorical source-trust factor.
pub const TRUST_CAP: u32 = 15;

/// Domain-based credibility bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrustTier {
    Official,
    Journalistic,
    National,
    Other,
}

impl TrustTier {
    pub const fn points(self) -> u32 {
        match self {
            Self::Official => 15,
            Self::Journalistic => 12,
            Self::National => 8,
            Self::Other => 5,
        }
    }

    pub const fn strength(self) -> Option<&'static str> {
        match self {
            Self::Official => Some("official or trusted source"),
            Self::Journalistic => Some("trusted journalistic source"),
            Self::National | Self::Other => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// Minimum score per level, best first. Anything lower is `Poor`.
pub const LEVEL_THRESHOLDS: &[(u32, QualityLevel)] = &[
    (90, QualityLevel::Excellent),
    (70, QualityLevel::Good),
    (50, QualityLevel::Fair),
];

/// Map a score to its level. Never returns `Invalid`.
pub fn level_for(score: u32) -> QualityLevel {
    LEVEL_THRESHOLDS
        .iter()
        .find(|(min, _)| score >= *min)
        .map_or(QualityLevel::Poor, |(_, level)| *level)
}
