//! Row-label matching for target concepts.
//!
//! Filers word the same line item differently ("Total revenues", "Total net
//! sales", "Total shareholders’ equity"), and the wording drifts between years.
//! [`LabelConfig`] holds the one authoritative list of accepted spellings per
//! concept; [`LabelMatcher`] compiles it into case-insensitive,
//! punctuation-tolerant patterns.

use crate::error::{ExtractError, Result};
use crate::model::TargetConcept;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Accepted spellings for one concept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptLabels {
    /// Concept these labels identify
    pub concept: TargetConcept,
    /// Spellings in priority order; a label containing any of them matches
    pub spellings: Vec<String>,
    /// Spellings that disqualify a label even if a spelling matched
    #[serde(default)]
    pub exclusions: Vec<String>,
}

impl ConceptLabels {
    fn new(concept: TargetConcept, spellings: &[&str], exclusions: &[&str]) -> Self {
        Self {
            concept,
            spellings: spellings.iter().map(ToString::to_string).collect(),
            exclusions: exclusions.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Label-to-concept configuration.
///
/// Passed explicitly to [`LabelMatcher::new`]; there is no global label table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    /// One entry per concept
    pub concepts: Vec<ConceptLabels>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            concepts: vec![
                ConceptLabels::new(
                    TargetConcept::TotalRevenue,
                    &[
                        "Total revenue",
                        "Total net revenue",
                        "Total net sales",
                        "Total sales",
                        "Net sales",
                        "Net revenue",
                    ],
                    &["cost of"],
                ),
                ConceptLabels::new(
                    TargetConcept::NetIncome,
                    &["Net income", "Net earnings", "Net loss"],
                    &["per share", "per common share", "noncontrolling", "non-controlling"],
                ),
                ConceptLabels::new(TargetConcept::TotalAssets, &["Total assets"], &[]),
                ConceptLabels::new(
                    TargetConcept::TotalLiabilities,
                    &["Total liabilities"],
                    &["and stockholders", "and shareholders", "and equity", "and deficit"],
                ),
                ConceptLabels::new(
                    TargetConcept::TotalStockholdersEquity,
                    &[
                        "Total stockholders' equity",
                        "Total shareholders' equity",
                        "Total stockholders' deficit",
                        "Total shareholders' deficit",
                        "Total stockholders' investment",
                        "Total equity",
                    ],
                    &["liabilities and"],
                ),
            ],
        }
    }
}

impl LabelConfig {
    /// Get the configured labels for a concept.
    pub fn get(&self, concept: TargetConcept) -> Option<&ConceptLabels> {
        self.concepts.iter().find(|c| c.concept == concept)
    }

    /// Check that each concept is configured at most once with at least one spelling.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.concepts {
            if !seen.insert(entry.concept) {
                return Err(ExtractError::Config(format!(
                    "concept {} is configured more than once",
                    entry.concept
                )));
            }
            if entry.spellings.iter().all(|s| s.trim().is_empty()) {
                return Err(ExtractError::Config(format!(
                    "concept {} has no spellings",
                    entry.concept
                )));
            }
        }
        Ok(())
    }
}

/// Build a case-insensitive pattern that tolerates whitespace and apostrophe variants.
///
/// Whitespace runs match any run of whitespace (including non-breaking
/// spaces), and an apostrophe matches a straight or curly apostrophe or none.
pub(crate) fn tolerant_pattern(text: &str) -> Result<Regex> {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| match c {
                    '\'' | '\u{2018}' | '\u{2019}' => "['\u{2018}\u{2019}]?".to_string(),
                    c => regex::escape(c.encode_utf8(&mut [0; 4])),
                })
                .collect()
        })
        .collect();

    if words.is_empty() {
        return Err(ExtractError::Config(format!(
            "empty pattern '{}'",
            text
        )));
    }

    RegexBuilder::new(&words.join(r"\s+"))
        .case_insensitive(true)
        .build()
        .map_err(|source| ExtractError::InvalidPattern {
            pattern: text.to_string(),
            source,
        })
}

#[derive(Debug)]
struct CompiledLabels {
    concept: TargetConcept,
    spellings: Vec<Regex>,
    exclusions: Vec<Regex>,
}

/// Compiled matcher answering "does this label name that concept?".
#[derive(Debug)]
pub struct LabelMatcher {
    entries: Vec<CompiledLabels>,
}

impl LabelMatcher {
    /// Compile a label configuration.
    ///
    /// # Errors
    /// Returns [`ExtractError::Config`] for duplicate or empty entries and
    /// [`ExtractError::InvalidPattern`] if a spelling does not compile.
    pub fn new(config: &LabelConfig) -> Result<Self> {
        config.validate()?;

        let entries = config
            .concepts
            .iter()
            .map(|entry| {
                let compile = |list: &[String]| -> Result<Vec<Regex>> {
                    list.iter()
                        .filter(|s| !s.trim().is_empty())
                        .map(|s| tolerant_pattern(s))
                        .collect()
                };
                Ok(CompiledLabels {
                    concept: entry.concept,
                    spellings: compile(&entry.spellings)?,
                    exclusions: compile(&entry.exclusions)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { entries })
    }

    /// Returns true if `candidate` contains an accepted spelling of `concept`
    /// and none of its exclusions.
    ///
    /// Spellings are tried in configured priority order. A concept with no
    /// configuration never matches.
    pub fn matches(&self, concept: TargetConcept, candidate: &str) -> bool {
        let Some(entry) = self.entries.iter().find(|e| e.concept == concept) else {
            return false;
        };

        if entry.exclusions.iter().any(|re| re.is_match(candidate)) {
            return false;
        }

        entry.spellings.iter().any(|re| re.is_match(candidate))
    }

    /// Concepts this matcher can recognize.
    pub fn concepts(&self) -> impl Iterator<Item = TargetConcept> + '_ {
        self.entries.iter().map(|e| e.concept)
    }
}
