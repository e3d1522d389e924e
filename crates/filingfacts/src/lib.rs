#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filingfacts/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod ingest;
pub mod pipeline;

// Re-export main types from sub-crates
pub use filingfacts_data as data;
pub use filingfacts_extract as extract;

pub use error::{Error, Result};
pub use ingest::{DocumentOutcome, DocumentReport, IngestionReport, Ingestor};
pub use pipeline::{CategoryReport, CompanyReport, Pipeline};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
