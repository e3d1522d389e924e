//! SQLite fact store.

use super::{FactStore, StoreStats};
use crate::error::{DataError, Result};
use chrono::Utc;
use filingfacts_extract::{FactKey, FilingCategory, NormalizedFact, PeriodKey, TargetConcept};
use log::debug;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use std::path::Path;

const SELECT_FACTS: &str = "SELECT company_id, category, period_key, document_id,
        total_revenue, net_income, total_assets, total_liabilities, total_stockholders_equity
     FROM facts";

/// [`FactStore`] backed by a SQLite database.
///
/// The table's primary key is the natural key, so a plain `INSERT` is the
/// uniqueness check.
#[derive(Debug)]
pub struct SqliteFactStore {
    conn: Connection,
}

impl SqliteFactStore {
    /// Open (or create) a store.
    ///
    /// # Arguments
    /// * `path` - Path to the SQLite database file
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS facts (
                company_id TEXT NOT NULL,
                category TEXT NOT NULL,
                period_key TEXT NOT NULL,
                document_id TEXT NOT NULL,
                total_revenue INTEGER,
                net_income INTEGER,
                total_assets INTEGER,
                total_liabilities INTEGER,
                total_stockholders_equity INTEGER,
                stored_at TEXT NOT NULL,
                PRIMARY KEY (company_id, category, period_key, document_id)
            )",
            [],
        )?;

        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_facts_company_category ON facts(company_id, category)",
            [],
        )?;

        Ok(())
    }

    fn write(&self, verb: &str, fact: &NormalizedFact) -> rusqlite::Result<usize> {
        let sql = format!(
            "{} INTO facts (
                company_id, category, period_key, document_id,
                total_revenue, net_income, total_assets, total_liabilities,
                total_stockholders_equity, stored_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            verb
        );

        self.conn.execute(
            &sql,
            params![
                fact.company_id(),
                fact.category().as_str(),
                fact.period_key().to_string(),
                fact.document_id(),
                fact.value(TargetConcept::TotalRevenue),
                fact.value(TargetConcept::NetIncome),
                fact.value(TargetConcept::TotalAssets),
                fact.value(TargetConcept::TotalLiabilities),
                fact.value(TargetConcept::TotalStockholdersEquity),
                Utc::now().to_rfc3339(),
            ],
        )
    }

    fn read_fact(row: &rusqlite::Row<'_>) -> rusqlite::Result<NormalizedFact> {
        let category: FilingCategory = row
            .get::<_, String>(1)?
            .parse()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        let period_key: PeriodKey = row
            .get::<_, String>(2)?
            .parse()
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let key = FactKey {
            company_id: row.get(0)?,
            category,
            period_key,
            document_id: row.get(3)?,
        };

        Ok(NormalizedFact::new(
            key,
            [
                (TargetConcept::TotalRevenue, row.get::<_, Option<i64>>(4)?),
                (TargetConcept::NetIncome, row.get::<_, Option<i64>>(5)?),
                (TargetConcept::TotalAssets, row.get::<_, Option<i64>>(6)?),
                (TargetConcept::TotalLiabilities, row.get::<_, Option<i64>>(7)?),
                (TargetConcept::TotalStockholdersEquity, row.get::<_, Option<i64>>(8)?),
            ],
        ))
    }

    /// Fetch one fact by its natural key.
    pub fn get(&self, key: &FactKey) -> Result<Option<NormalizedFact>> {
        let sql = format!(
            "{} WHERE company_id = ?1 AND category = ?2 AND period_key = ?3 AND document_id = ?4",
            SELECT_FACTS
        );
        let fact = self
            .conn
            .query_row(
                &sql,
                params![
                    key.company_id,
                    key.category.as_str(),
                    key.period_key.to_string(),
                    key.document_id
                ],
                Self::read_fact,
            )
            .optional()?;

        Ok(fact)
    }

    /// Delete every fact of a company. Returns the number of facts removed.
    pub fn delete_company(&self, company_id: &str) -> Result<usize> {
        let removed = self
            .conn
            .execute("DELETE FROM facts WHERE company_id = ?1", params![company_id])?;
        Ok(removed)
    }

    /// Get store statistics.
    pub fn stats(&self) -> Result<StoreStats> {
        let count = |sql: &str| -> Result<usize> {
            let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
            Ok(n as usize)
        };

        Ok(StoreStats {
            total_facts: count("SELECT COUNT(*) FROM facts")?,
            companies: count("SELECT COUNT(DISTINCT company_id) FROM facts")?,
            annual_facts: count("SELECT COUNT(*) FROM facts WHERE category = 'annual'")?,
            quarterly_facts: count("SELECT COUNT(*) FROM facts WHERE category = 'quarterly'")?,
            unknown_periods: count("SELECT COUNT(*) FROM facts WHERE period_key = 'unknown'")?,
        })
    }
}

impl FactStore for SqliteFactStore {
    fn exists(&self, key: &FactKey) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM facts
             WHERE company_id = ?1 AND category = ?2 AND period_key = ?3 AND document_id = ?4",
            params![
                key.company_id,
                key.category.as_str(),
                key.period_key.to_string(),
                key.document_id
            ],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    fn insert(&self, fact: &NormalizedFact) -> Result<()> {
        match self.write("INSERT", fact) {
            Ok(_) => {
                debug!("stored {}", fact.key());
                Ok(())
            }
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                Err(DataError::DuplicateKey {
                    key: fact.key().to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn upsert(&self, fact: &NormalizedFact) -> Result<()> {
        self.write("INSERT OR REPLACE", fact)?;
        debug!("replaced {}", fact.key());
        Ok(())
    }

    fn query_by(
        &self,
        company_id: &str,
        category: Option<FilingCategory>,
    ) -> Result<Vec<NormalizedFact>> {
        let sql = format!(
            "{} WHERE company_id = ?1 AND (?2 IS NULL OR category = ?2)",
            SELECT_FACTS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let rows = stmt.query_map(
            params![company_id, category.map(|c| c.as_str())],
            Self::read_fact,
        )?;

        let mut facts = Vec::new();
        for row in rows {
            facts.push(row?);
        }
        facts.sort_by(|a, b| a.key().cmp(b.key()));

        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(company: &str, category: FilingCategory, period: &str, doc: &str) -> NormalizedFact {
        let key = FactKey {
            company_id: company.to_string(),
            category,
            period_key: period.parse().unwrap(),
            document_id: doc.to_string(),
        };
        NormalizedFact::new(
            key,
            [
                (TargetConcept::TotalRevenue, Some(1_000_000)),
                (TargetConcept::NetIncome, Some(-250_000)),
            ],
        )
    }

    #[test]
    fn test_store_initialization() {
        let store = SqliteFactStore::in_memory();
        assert!(store.is_ok());
        assert_eq!(store.unwrap().stats().unwrap(), StoreStats::default());
    }

    #[test]
    fn test_insert_and_get_round_trip() {
        let store = SqliteFactStore::in_memory().unwrap();
        let fact = fact("AAPL", FilingCategory::Quarterly, "3Q2023", "0000320193-23-000077");

        store.insert(&fact).unwrap();

        let loaded = store.get(fact.key()).unwrap().unwrap();
        assert_eq!(loaded, fact);
        assert_eq!(loaded.value(TargetConcept::NetIncome), Some(-250_000));
        assert_eq!(loaded.value(TargetConcept::TotalAssets), None);
    }

    #[test]
    fn test_insert_duplicate_key_fails() {
        let store = SqliteFactStore::in_memory().unwrap();
        let fact = fact("AAPL", FilingCategory::Annual, "2023", "0000320193-23-000106");

        store.insert(&fact).unwrap();
        let err = store.insert(&fact).unwrap_err();

        assert!(err.is_duplicate_key());
        assert!(err.to_string().contains("AAPL/annual/2023/0000320193-23-000106"));
        assert_eq!(store.stats().unwrap().total_facts, 1);
    }

    #[test]
    fn test_upsert_replaces() {
        let store = SqliteFactStore::in_memory().unwrap();
        let original = fact("AAPL", FilingCategory::Annual, "2023", "doc");
        store.insert(&original).unwrap();

        let replacement = NormalizedFact::new(
            original.key().clone(),
            [(TargetConcept::TotalAssets, Some(352_583_000_000))],
        );
        store.upsert(&replacement).unwrap();

        let loaded = store.get(original.key()).unwrap().unwrap();
        assert_eq!(loaded.value(TargetConcept::TotalAssets), Some(352_583_000_000));
        assert_eq!(loaded.value(TargetConcept::TotalRevenue), None);
        assert_eq!(store.stats().unwrap().total_facts, 1);
    }

    #[test]
    fn test_exists() {
        let store = SqliteFactStore::in_memory().unwrap();
        let fact = fact("AAPL", FilingCategory::Annual, "2023", "doc");
        assert!(!store.exists(fact.key()).unwrap());

        store.insert(&fact).unwrap();
        assert!(store.exists(fact.key()).unwrap());

        let mut other = fact.key().clone();
        other.document_id = "other-doc".to_string();
        assert!(!store.exists(&other).unwrap());
    }

    #[test]
    fn test_query_by_sorts_and_filters() {
        let store = SqliteFactStore::in_memory().unwrap();
        for f in [
            fact("AAPL", FilingCategory::Quarterly, "unknown", "d5"),
            fact("AAPL", FilingCategory::Quarterly, "1Q2024", "d4"),
            fact("AAPL", FilingCategory::Quarterly, "4Q2023", "d3"),
            fact("AAPL", FilingCategory::Annual, "2023", "d2"),
            fact("MSFT", FilingCategory::Annual, "2023", "d1"),
        ] {
            store.insert(&f).unwrap();
        }

        let quarterly = store
            .query_by("AAPL", Some(FilingCategory::Quarterly))
            .unwrap();
        let periods: Vec<String> = quarterly.iter().map(|f| f.period_key().to_string()).collect();
        assert_eq!(periods, vec!["4Q2023", "1Q2024", "unknown"]);

        let all = store.query_by("AAPL", None).unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].category(), FilingCategory::Annual);

        assert!(store.query_by("GOOG", None).unwrap().is_empty());
    }

    #[test]
    fn test_stats_and_delete_company() {
        let store = SqliteFactStore::in_memory().unwrap();
        store
            .insert(&fact("AAPL", FilingCategory::Annual, "2023", "a"))
            .unwrap();
        store
            .insert(&fact("AAPL", FilingCategory::Quarterly, "unknown", "b"))
            .unwrap();
        store
            .insert(&fact("MSFT", FilingCategory::Quarterly, "2Q2023", "c"))
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_facts, 3);
        assert_eq!(stats.companies, 2);
        assert_eq!(stats.annual_facts, 1);
        assert_eq!(stats.quarterly_facts, 2);
        assert_eq!(stats.unknown_periods, 1);

        assert_eq!(store.delete_company("AAPL").unwrap(), 2);
        assert_eq!(store.stats().unwrap().total_facts, 1);
    }

    #[test]
    fn test_file_backed_store_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("facts.db");
        let fact = fact("AAPL", FilingCategory::Annual, "2022", "doc");

        SqliteFactStore::new(&path).unwrap().insert(&fact).unwrap();

        let reopened = SqliteFactStore::new(&path).unwrap();
        assert!(reopened.exists(fact.key()).unwrap());
    }
}
