//! In-memory fact store.

use super::{FactStore, StoreStats};
use crate::error::{DataError, Result};
use filingfacts_extract::{FactKey, FilingCategory, NormalizedFact};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// [`FactStore`] held in a map, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryFactStore {
    facts: Mutex<BTreeMap<FactKey, NormalizedFact>>,
}

impl MemoryFactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn facts(&self) -> MutexGuard<'_, BTreeMap<FactKey, NormalizedFact>> {
        self.facts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of stored facts.
    pub fn len(&self) -> usize {
        self.facts().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.facts().is_empty()
    }

    /// Get store statistics.
    pub fn stats(&self) -> StoreStats {
        let facts = self.facts();
        let mut companies: Vec<&str> = facts.keys().map(|k| k.company_id.as_str()).collect();
        companies.dedup();

        StoreStats {
            total_facts: facts.len(),
            companies: companies.len(),
            annual_facts: facts
                .keys()
                .filter(|k| k.category == FilingCategory::Annual)
                .count(),
            quarterly_facts: facts
                .keys()
                .filter(|k| k.category == FilingCategory::Quarterly)
                .count(),
            unknown_periods: facts.keys().filter(|k| !k.period_key.is_resolved()).count(),
        }
    }
}

impl FactStore for MemoryFactStore {
    fn exists(&self, key: &FactKey) -> Result<bool> {
        Ok(self.facts().contains_key(key))
    }

    fn insert(&self, fact: &NormalizedFact) -> Result<()> {
        match self.facts().entry(fact.key().clone()) {
            Entry::Occupied(_) => Err(DataError::DuplicateKey {
                key: fact.key().to_string(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(fact.clone());
                Ok(())
            }
        }
    }

    fn upsert(&self, fact: &NormalizedFact) -> Result<()> {
        self.facts().insert(fact.key().clone(), fact.clone());
        Ok(())
    }

    fn query_by(
        &self,
        company_id: &str,
        category: Option<FilingCategory>,
    ) -> Result<Vec<NormalizedFact>> {
        Ok(self
            .facts()
            .values()
            .filter(|f| f.company_id() == company_id)
            .filter(|f| category.is_none_or(|c| f.category() == c))
            .cloned()
            .collect())
    }
}
