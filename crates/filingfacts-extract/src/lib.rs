#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filingfacts/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod extractor;
pub mod labels;
pub mod model;
pub mod normalize;
pub mod period;
pub mod scanner;

pub use config::{AnchorConfig, DEFAULT_REPORTING_UNIT, ExtractionConfig, ReportingUnit, ScalingPolicy};
pub use error::{ExtractError, Result};
pub use extractor::Extractor;
pub use labels::{ConceptLabels, LabelConfig, LabelMatcher};
pub use model::{FactKey, FilingCategory, NormalizedFact, PeriodKey, RawDocument, TargetConcept};
pub use normalize::normalize;
pub use scanner::{DocumentScanner, ParsedTree, TableRegion, all_tables};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
