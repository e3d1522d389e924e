//! Persistent storage of normalized facts.
//!
//! A [`FactStore`] keeps at most one fact per natural key
//! `(company_id, category, period_key, document_id)`. The uniqueness check
//! belongs to the store: [`FactStore::insert`] fails with
//! [`DataError::DuplicateKey`](crate::DataError::DuplicateKey) on collision,
//! which makes it the atomic guard when several writers race.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryFactStore;
pub use sqlite::SqliteFactStore;

use crate::error::Result;
use filingfacts_extract::{FactKey, FilingCategory, NormalizedFact};

/// Storage backend for normalized facts.
pub trait FactStore {
    /// Returns true if a fact with this natural key is stored.
    fn exists(&self, key: &FactKey) -> Result<bool>;

    /// Store a new fact.
    ///
    /// # Errors
    /// Returns `DataError::DuplicateKey` if the key is already stored.
    fn insert(&self, fact: &NormalizedFact) -> Result<()>;

    /// Store a fact, replacing any fact with the same key.
    fn upsert(&self, fact: &NormalizedFact) -> Result<()>;

    /// All facts of a company, optionally restricted to one category.
    ///
    /// Results are sorted by [`FactKey`]: category, then period
    /// chronologically (unknown periods last), then document id.
    fn query_by(
        &self,
        company_id: &str,
        category: Option<FilingCategory>,
    ) -> Result<Vec<NormalizedFact>>;
}

/// Fact store statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of stored facts
    pub total_facts: usize,
    /// Number of distinct companies
    pub companies: usize,
    /// Facts from annual reports
    pub annual_facts: usize,
    /// Facts from quarterly reports
    pub quarterly_facts: usize,
    /// Facts stored under the unknown-period marker
    pub unknown_periods: usize,
}
