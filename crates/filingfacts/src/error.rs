//! Top-level error type.

use filingfacts_data::DataError;
use filingfacts_extract::ExtractError;
use thiserror::Error;

/// Result type for pipeline setup.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while setting up extraction or storage.
///
/// Per-document and per-category failures never surface here; they are
/// recorded in the reports instead.
#[derive(Debug, Error)]
pub enum Error {
    /// Extraction engine error
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Fetching or storage error
    #[error(transparent)]
    Data(#[from] DataError),
}
