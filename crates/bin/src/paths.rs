//! Default locations of the fact database and the filing cache.
//!
//! Uses platform-specific cache directories:
//! - Linux: `~/.cache/filingfacts/`
//! - macOS: `~/Library/Caches/filingfacts/`
//! - Windows: `%LOCALAPPDATA%\filingfacts\`

use filingfacts_data::{DataError, SqliteFactStore};
use std::path::{Path, PathBuf};

/// Get the default data directory.
pub(crate) fn default_data_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("filingfacts")
}

/// Get the default fact database path.
pub(crate) fn default_db_path() -> PathBuf {
    default_data_dir().join("filingfacts.db")
}

/// Get the default filing cache root.
pub(crate) fn default_filings_dir() -> PathBuf {
    default_data_dir().join("filings")
}

/// Open the fact store, creating its directory if needed.
pub(crate) fn open_store(db_path: &Path) -> Result<SqliteFactStore, DataError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    SqliteFactStore::new(db_path)
}
