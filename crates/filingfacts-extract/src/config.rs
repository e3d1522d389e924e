//! Extraction configuration.
//!
//! Everything the engine needs to know about labels, anchor phrases and unit
//! scaling is carried in an [`ExtractionConfig`] value. The defaults are the
//! authoritative built-in lists; a JSON file can override any section.

use crate::error::Result;
use crate::labels::LabelConfig;
use crate::model::FilingCategory;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Unit in which a filing states its numeric table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportingUnit {
    /// Whole currency units
    Units,
    /// Thousands
    Thousands,
    /// Millions
    Millions,
    /// Billions
    Billions,
}

impl ReportingUnit {
    /// Factor that converts a stated value to whole currency units.
    pub const fn multiplier(&self) -> i64 {
        match self {
            Self::Units => 1,
            Self::Thousands => 1_000,
            Self::Millions => 1_000_000,
            Self::Billions => 1_000_000_000,
        }
    }

    /// Parse a unit word such as `millions` or `Thousands`.
    pub fn from_word(word: &str) -> Option<Self> {
        match word.trim().to_ascii_lowercase().as_str() {
            "thousand" | "thousands" => Some(Self::Thousands),
            "million" | "millions" => Some(Self::Millions),
            "billion" | "billions" => Some(Self::Billions),
            _ => None,
        }
    }
}

/// Statements in consolidated financial tables are taken to be in millions
/// unless the configuration says otherwise.
pub const DEFAULT_REPORTING_UNIT: ReportingUnit = ReportingUnit::Millions;

/// How normalized cell values are scaled to whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ScalingPolicy {
    /// Apply one unit to every document regardless of what it states
    Fixed {
        /// Unit applied to all matched cells
        unit: ReportingUnit,
    },
    /// Use the first "(in millions…)" style statement in the document
    Stated {
        /// Unit used when the document states none
        fallback: ReportingUnit,
    },
}

impl Default for ScalingPolicy {
    fn default() -> Self {
        Self::Fixed {
            unit: DEFAULT_REPORTING_UNIT,
        }
    }
}

/// Anchor phrases that precede the period-end date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorConfig {
    /// Phrases for annual reports, tried in order
    pub annual: Vec<String>,
    /// Phrases for quarterly reports, tried in order
    pub quarterly: Vec<String>,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            annual: vec!["For the Fiscal Year Ended".to_string()],
            quarterly: vec![
                "For the Quarter Ended".to_string(),
                "For the Quarterly Period Ended".to_string(),
            ],
        }
    }
}

impl AnchorConfig {
    /// Phrases for a category.
    pub fn phrases(&self, category: FilingCategory) -> &[String] {
        match category {
            FilingCategory::Annual => &self.annual,
            FilingCategory::Quarterly => &self.quarterly,
        }
    }
}

/// Complete engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Label spellings per concept
    pub labels: LabelConfig,
    /// Period anchor phrases per category
    pub anchors: AnchorConfig,
    /// Reporting-unit scaling
    pub scaling: ScalingPolicy,
}

impl ExtractionConfig {
    /// Parse a configuration from JSON. Missing sections keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.labels.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}
