//! Error types for extraction operations.

use thiserror::Error;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur while configuring the engine or extracting a document.
///
/// Only [`ExtractError::Parse`] is produced by [`crate::Extractor::extract`];
/// a concept that cannot be found is an absent value, not an error.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The raw document could not be structurally parsed at all
    #[error("Failed to parse document {document_id}: {reason}")]
    Parse {
        /// Identifier of the offending document
        document_id: String,
        /// What made the content unparseable
        reason: String,
    },

    /// A label spelling or anchor phrase did not compile
    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        /// The configured text that failed to compile
        pattern: String,
        /// Underlying regex error
        #[source]
        source: regex::Error,
    },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unknown filing category
    #[error("Unknown filing category: {0}")]
    UnknownCategory(String),

    /// Unknown target concept
    #[error("Unknown target concept: {0}")]
    UnknownConcept(String),

    /// Malformed period key
    #[error("Invalid period key: {0}")]
    InvalidPeriodKey(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ExtractError {
    /// Build a parse error for a document.
    pub fn parse(document_id: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            document_id: document_id.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error means the document itself was unparseable.
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
