#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filingfacts/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod edgar;
pub mod error;
pub mod fetch;
pub mod store;

pub use edgar::{DownloadSummary, EdgarClient, EdgarDownloader};
pub use error::{DataError, Result};
pub use fetch::{DocumentFetcher, FetchRequest, FilingCache};
pub use store::{FactStore, MemoryFactStore, SqliteFactStore, StoreStats};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
