//! Single-document fact extraction.

use crate::config::{ExtractionConfig, ReportingUnit, ScalingPolicy};
use crate::error::Result;
use crate::labels::LabelMatcher;
use crate::model::{FactKey, NormalizedFact, PeriodKey, RawDocument, TargetConcept};
use crate::normalize::normalize;
use crate::period;
use crate::scanner::{DocumentScanner, ParsedTree, all_tables};
use log::{debug, warn};
use std::collections::BTreeMap;

/// Turns one [`RawDocument`] into one [`NormalizedFact`].
///
/// An extractor holds only compiled configuration, so a single instance can
/// be shared by reference across threads.
///
/// # Example
///
/// ```
/// use filingfacts_extract::{Extractor, FilingCategory, RawDocument, TargetConcept};
///
/// let html = "<html><body>
///     <p>For the Fiscal Year Ended June 30, 2023</p>
///     <table><tr><td>Total assets</td><td>$</td><td>411,976</td></tr></table>
/// </body></html>";
/// let doc = RawDocument::new("MSFT", FilingCategory::Annual, "0000950170-23-035122", html);
///
/// let extractor = Extractor::with_default_config().unwrap();
/// let fact = extractor.extract(&doc).unwrap();
/// assert_eq!(fact.period_key().to_string(), "2023");
/// assert_eq!(fact.value(TargetConcept::TotalAssets), Some(411_976_000_000));
/// ```
#[derive(Debug)]
pub struct Extractor {
    matcher: LabelMatcher,
    scanner: DocumentScanner,
    scaling: ScalingPolicy,
}

impl Extractor {
    /// Compile an extractor from configuration.
    pub fn new(config: &ExtractionConfig) -> Result<Self> {
        Ok(Self {
            matcher: LabelMatcher::new(&config.labels)?,
            scanner: DocumentScanner::new(&config.anchors)?,
            scaling: config.scaling,
        })
    }

    /// Extractor with the built-in labels, anchors and millions scaling.
    pub fn with_default_config() -> Result<Self> {
        Self::new(&ExtractionConfig::default())
    }

    /// Extract the headline metrics and period of one document.
    ///
    /// Tables are scanned in document order and, for each concept, the first
    /// row whose label names it decides that concept; later rows never
    /// overwrite it. One row can decide several concepts.
    /// If that row holds no number the concept stays absent. Values are
    /// scaled to whole currency units; a product that overflows is absent.
    ///
    /// # Errors
    /// Returns [`crate::ExtractError::Parse`] only when the content cannot be
    /// parsed at all. Missing concepts or an unresolvable period are not errors.
    pub fn extract(&self, doc: &RawDocument) -> Result<NormalizedFact> {
        let tree = ParsedTree::from_document(doc)?;
        let unit = self.reporting_unit(&tree);
        let period_key = self.resolve_period(&tree, doc);

        let mut remaining: Vec<TargetConcept> = self.matcher.concepts().collect();
        let mut values: BTreeMap<TargetConcept, Option<i64>> = BTreeMap::new();

        'tables: for table in all_tables(&tree) {
            for row in table.rows() {
                if remaining.is_empty() {
                    break 'tables;
                }

                let Some(label_index) = row.iter().position(|cell| !cell.is_empty()) else {
                    continue;
                };
                let label = &row[label_index];

                let (matched, unmatched): (Vec<TargetConcept>, Vec<TargetConcept>) = remaining
                    .iter()
                    .copied()
                    .partition(|&concept| self.matcher.matches(concept, label));
                if matched.is_empty() {
                    continue;
                }
                remaining = unmatched;

                let number = row[label_index + 1..].iter().find_map(|cell| normalize(cell));
                for concept in matched {
                    let value = number.and_then(|value| scale(value, unit, doc, concept));
                    debug!(
                        "{}: {} from row '{}' = {:?}",
                        doc.document_id(),
                        concept,
                        label,
                        value
                    );
                    values.insert(concept, value);
                }
            }
        }

        let key = FactKey {
            company_id: doc.company_id().to_string(),
            category: doc.category(),
            period_key,
            document_id: doc.document_id().to_string(),
        };

        Ok(NormalizedFact::new(key, values))
    }

    fn reporting_unit(&self, tree: &ParsedTree) -> ReportingUnit {
        match self.scaling {
            ScalingPolicy::Fixed { unit } => unit,
            ScalingPolicy::Stated { fallback } => {
                self.scanner.find_stated_unit(tree).unwrap_or(fallback)
            }
        }
    }

    fn resolve_period(&self, tree: &ParsedTree, doc: &RawDocument) -> PeriodKey {
        let anchored = self
            .scanner
            .find_period_anchor(tree, doc.category())
            .and_then(|text| {
                let key = period::resolve(&text, doc.category());
                if key.is_none() {
                    debug!(
                        "{}: anchor '{}' holds no readable date",
                        doc.document_id(),
                        text
                    );
                }
                key
            });

        if let Some(key) = anchored {
            return key;
        }

        if let Some(key) = self
            .scanner
            .find_conformed_period(tree)
            .and_then(|text| period::resolve(&text, doc.category()))
        {
            debug!(
                "{}: period taken from submission header",
                doc.document_id()
            );
            return key;
        }

        warn!("{}: period end could not be resolved", doc.document_id());
        PeriodKey::Unknown
    }
}

fn scale(value: i64, unit: ReportingUnit, doc: &RawDocument, concept: TargetConcept) -> Option<i64> {
    let scaled = value.checked_mul(unit.multiplier());
    if scaled.is_none() {
        warn!(
            "{}: {} value {} overflows when scaled by {}",
            doc.document_id(),
            concept,
            value,
            unit.multiplier()
        );
    }
    scaled
}
