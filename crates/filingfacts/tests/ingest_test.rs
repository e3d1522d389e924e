//! Integration tests for batch ingestion and the per-company pipeline

use filingfacts::data::{
    DataError, FactStore, FetchRequest, FilingCache, MemoryFactStore, SqliteFactStore,
};
use filingfacts::extract::{
    Extractor, FactKey, FilingCategory, NormalizedFact, PeriodKey, RawDocument, TargetConcept,
};
use filingfacts::{DocumentOutcome, Ingestor, Pipeline};
use rstest::{fixture, rstest};
use std::cell::Cell;

#[fixture]
fn extractor() -> Extractor {
    Extractor::with_default_config().unwrap()
}

fn quarterly_filing(month_day_year: &str, revenue: &str) -> String {
    format!(
        "<html><body>
         <p>For the Quarter Ended {}</p>
         <table>
           <tr><td>Total revenue</td><td>$</td><td>{}</td></tr>
           <tr><td>Net income</td><td>$</td><td>100</td></tr>
         </table>
         </body></html>",
        month_day_year, revenue
    )
}

fn doc(document_id: &str, content: impl Into<Vec<u8>>) -> RawDocument {
    RawDocument::new("ACME", FilingCategory::Quarterly, document_id, content)
}

fn batch_with_one_corrupted() -> Vec<RawDocument> {
    vec![
        doc("d1", quarterly_filing("March 31, 2023", "1,000")),
        doc("d2", quarterly_filing("June 30, 2023", "1,100")),
        doc("d3", b"\x00\x01\x02\xff\xfe\x00\x00\x13\x10\x00".repeat(64)),
        doc("d4", quarterly_filing("September 30, 2023", "1,200")),
        doc("d5", quarterly_filing("December 31, 2023", "1,300")),
    ]
}

#[rstest]
fn test_batch_of_five_with_one_corrupted(extractor: Extractor) {
    let store = SqliteFactStore::in_memory().unwrap();
    let ingestor = Ingestor::new(&extractor, &store);

    let report = ingestor.ingest("ACME", FilingCategory::Quarterly, &batch_with_one_corrupted(), false);

    assert_eq!(report.total(), 5);
    assert_eq!(report.inserted(), 4);
    assert_eq!(report.failed(), 1);
    assert!(matches!(report.documents[2].outcome, DocumentOutcome::Failed(_)));
    assert_eq!(report.documents[2].document_id, "d3");
    assert_eq!(report.documents[2].period_key, None);

    let stored = store.query_by("ACME", None).unwrap();
    let periods: Vec<String> = stored.iter().map(|f| f.period_key().to_string()).collect();
    assert_eq!(periods, vec!["1Q2023", "2Q2023", "3Q2023", "4Q2023"]);
    assert_eq!(stored[0].value(TargetConcept::TotalRevenue), Some(1_000_000_000));
}

#[rstest]
fn test_ingesting_twice_is_idempotent(extractor: Extractor) {
    let store = SqliteFactStore::in_memory().unwrap();
    let ingestor = Ingestor::new(&extractor, &store);
    let batch = vec![doc("d1", quarterly_filing("March 31, 2023", "1,000"))];

    let first = ingestor.ingest("ACME", FilingCategory::Quarterly, &batch, false);
    let second = ingestor.ingest("ACME", FilingCategory::Quarterly, &batch, false);

    assert_eq!(first.documents[0].outcome, DocumentOutcome::Inserted);
    assert_eq!(second.documents[0].outcome, DocumentOutcome::SkippedDuplicate);
    assert_eq!(store.stats().unwrap().total_facts, 1);
}

#[rstest]
fn test_duplicate_within_one_batch(extractor: Extractor) {
    let store = MemoryFactStore::new();
    let ingestor = Ingestor::new(&extractor, &store);
    let filing = quarterly_filing("March 31, 2023", "1,000");

    let report = ingestor.ingest(
        "ACME",
        FilingCategory::Quarterly,
        &[doc("d1", filing.clone()), doc("d1", filing)],
        false,
    );

    assert_eq!(report.inserted(), 1);
    assert_eq!(report.skipped(), 1);
}

#[rstest]
fn test_overwrite_replaces_stored_fact(extractor: Extractor) {
    let store = SqliteFactStore::in_memory().unwrap();
    let ingestor = Ingestor::new(&extractor, &store);

    ingestor.ingest(
        "ACME",
        FilingCategory::Quarterly,
        &[doc("d1", quarterly_filing("March 31, 2023", "1,000"))],
        false,
    );
    let report = ingestor.ingest(
        "ACME",
        FilingCategory::Quarterly,
        &[doc("d1", quarterly_filing("March 31, 2023", "2,000"))],
        true,
    );

    assert_eq!(report.documents[0].outcome, DocumentOutcome::Inserted);
    let stored = store.query_by("ACME", None).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].value(TargetConcept::TotalRevenue), Some(2_000_000_000));
}

#[rstest]
fn test_unknown_period_is_stored_per_document(extractor: Extractor) {
    let store = MemoryFactStore::new();
    let ingestor = Ingestor::new(&extractor, &store);
    let undated = "<table><tr><td>Total assets</td><td>7</td></tr></table>";

    let report = ingestor.ingest(
        "ACME",
        FilingCategory::Quarterly,
        &[doc("d1", undated), doc("d2", undated)],
        false,
    );

    assert_eq!(report.inserted(), 2);
    assert_eq!(report.documents[0].period_key, Some(PeriodKey::Unknown));
    assert_eq!(store.stats().unknown_periods, 2);
}

#[rstest]
fn test_document_for_another_company_fails(extractor: Extractor) {
    let store = MemoryFactStore::new();
    let ingestor = Ingestor::new(&extractor, &store);
    let stray = RawDocument::new(
        "OTHER",
        FilingCategory::Quarterly,
        "d1",
        quarterly_filing("March 31, 2023", "1"),
    );

    let report = ingestor.ingest("ACME", FilingCategory::Quarterly, &[stray], false);
    assert_eq!(report.failed(), 1);
    assert!(store.is_empty());
}

/// Store that reports keys as absent but loses every insert race, or fails outright.
#[derive(Debug)]
struct RacingStore {
    fail_with_database_error: bool,
    inserts: Cell<usize>,
}

impl FactStore for RacingStore {
    fn exists(&self, _key: &FactKey) -> filingfacts::data::Result<bool> {
        Ok(false)
    }

    fn insert(&self, fact: &NormalizedFact) -> filingfacts::data::Result<()> {
        self.inserts.set(self.inserts.get() + 1);
        if self.fail_with_database_error {
            Err(DataError::Parse("disk full".to_string()))
        } else {
            Err(DataError::DuplicateKey {
                key: fact.key().to_string(),
            })
        }
    }

    fn upsert(&self, _fact: &NormalizedFact) -> filingfacts::data::Result<()> {
        Ok(())
    }

    fn query_by(
        &self,
        _company_id: &str,
        _category: Option<FilingCategory>,
    ) -> filingfacts::data::Result<Vec<NormalizedFact>> {
        Ok(Vec::new())
    }
}

#[rstest]
#[case::lost_race(false, DocumentOutcome::SkippedDuplicate)]
#[case::store_failure(true, DocumentOutcome::Failed("Data parsing error: disk full".to_string()))]
fn test_store_errors_on_insert(
    extractor: Extractor,
    #[case] fail_with_database_error: bool,
    #[case] expected: DocumentOutcome,
) {
    let store = RacingStore {
        fail_with_database_error,
        inserts: Cell::new(0),
    };
    let ingestor = Ingestor::new(&extractor, &store);

    let report = ingestor.ingest(
        "ACME",
        FilingCategory::Quarterly,
        &[doc("d1", quarterly_filing("March 31, 2023", "1"))],
        false,
    );

    assert_eq!(report.documents[0].outcome, expected);
    assert_eq!(store.inserts.get(), 1);
}

#[rstest]
fn test_pipeline_continues_after_fetch_failure(extractor: Extractor) {
    let dir = tempfile::TempDir::new().unwrap();
    let cache = FilingCache::new(dir.path());
    cache
        .store(
            "ACME",
            FilingCategory::Quarterly,
            "0000000000-23-000001",
            None,
            quarterly_filing("March 31, 2023", "1,000").as_bytes(),
        )
        .unwrap();
    cache
        .store(
            "ACME",
            FilingCategory::Quarterly,
            "0000000000-23-000002",
            None,
            quarterly_filing("June 30, 2023", "1,000").as_bytes(),
        )
        .unwrap();

    let pipeline = Pipeline::new(extractor, cache, MemoryFactStore::new());
    let mut progress = Vec::new();
    let report = pipeline.process_company_with(
        "ACME",
        &[
            (FilingCategory::Annual, FetchRequest::all()),
            (FilingCategory::Quarterly, FetchRequest::latest(1)),
        ],
        false,
        |total, line| progress.push((total, line.map(|l| l.document_id.clone()))),
    );

    assert_eq!(report.categories.len(), 2);
    assert!(report.categories[0].fetch_error.is_some());
    assert_eq!(report.categories[0].ingestion.total(), 0);
    assert!(report.categories[1].fetch_error.is_none());
    assert_eq!(report.inserted(), 1);
    assert_eq!(report.failed(), 1);

    assert_eq!(
        progress,
        vec![(1, None), (1, Some("0000000000-23-000002".to_string()))]
    );

    let stored = pipeline.store().query_by("ACME", None).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].period_key().to_string(), "2Q2023");
}

#[test]
fn test_report_serializes_outcomes() {
    let extractor = Extractor::with_default_config().unwrap();
    let store = MemoryFactStore::new();
    let ingestor = Ingestor::new(&extractor, &store);

    let report = ingestor.ingest(
        "ACME",
        FilingCategory::Quarterly,
        &[doc("d1", quarterly_filing("March 31, 2023", "1")), doc("d2", "")],
        false,
    );
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["category"], "quarterly");
    assert_eq!(json["documents"][0]["period_key"], "1Q2023");
    assert_eq!(json["documents"][0]["outcome"]["status"], "inserted");
    assert_eq!(json["documents"][1]["outcome"]["status"], "failed");
}
