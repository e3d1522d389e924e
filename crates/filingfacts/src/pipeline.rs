//! Per-company processing: fetch each filing category, then ingest it.

use crate::error::Result;
use crate::ingest::{DocumentReport, IngestionReport, Ingestor};
use filingfacts_data::{DocumentFetcher, FactStore, FetchRequest};
use filingfacts_extract::{ExtractionConfig, Extractor, FilingCategory};
use log::{info, warn};
use serde::Serialize;

/// Outcome of one category of one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryReport {
    /// Filing category
    pub category: FilingCategory,
    /// Why fetching failed, if it did; the ingestion report is then empty
    pub fetch_error: Option<String>,
    /// Per-document results
    pub ingestion: IngestionReport,
}

/// Outcome of processing one company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyReport {
    /// Company identifier
    pub company_id: String,
    /// One entry per requested category, in request order
    pub categories: Vec<CategoryReport>,
}

impl CompanyReport {
    /// Facts stored across all categories.
    pub fn inserted(&self) -> usize {
        self.categories.iter().map(|c| c.ingestion.inserted()).sum()
    }

    /// Documents skipped as duplicates across all categories.
    pub fn skipped(&self) -> usize {
        self.categories.iter().map(|c| c.ingestion.skipped()).sum()
    }

    /// Failed documents plus failed fetches across all categories.
    pub fn failed(&self) -> usize {
        self.categories
            .iter()
            .map(|c| c.ingestion.failed() + usize::from(c.fetch_error.is_some()))
            .sum()
    }
}

/// Fetch-and-ingest driver over a fetcher and a fact store.
#[derive(Debug)]
pub struct Pipeline<F, S> {
    extractor: Extractor,
    fetcher: F,
    store: S,
}

impl<F: DocumentFetcher, S: FactStore> Pipeline<F, S> {
    /// Create a pipeline around an already configured extractor.
    pub const fn new(extractor: Extractor, fetcher: F, store: S) -> Self {
        Self {
            extractor,
            fetcher,
            store,
        }
    }

    /// Create a pipeline from an extraction configuration.
    pub fn with_config(config: &ExtractionConfig, fetcher: F, store: S) -> Result<Self> {
        Ok(Self::new(Extractor::new(config)?, fetcher, store))
    }

    /// The fact store the pipeline writes to.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Process one company across the requested categories.
    ///
    /// A fetch failure is recorded for that category and processing moves on
    /// to the next one.
    pub fn process_company(
        &self,
        company_id: &str,
        categories: &[(FilingCategory, FetchRequest)],
        overwrite: bool,
    ) -> CompanyReport {
        self.process_company_with(company_id, categories, overwrite, |_, _| {})
    }

    /// Process one company, reporting progress through `on_document`.
    ///
    /// `on_document(n, None)` is called once a category's `n` documents are
    /// fetched, then `on_document(n, Some(line))` after each of them.
    pub fn process_company_with<P>(
        &self,
        company_id: &str,
        categories: &[(FilingCategory, FetchRequest)],
        overwrite: bool,
        mut on_document: P,
    ) -> CompanyReport
    where
        P: FnMut(usize, Option<&DocumentReport>),
    {
        let ingestor = Ingestor::new(&self.extractor, &self.store);
        let mut report = CompanyReport {
            company_id: company_id.to_string(),
            categories: Vec::with_capacity(categories.len()),
        };

        for &(category, request) in categories {
            let documents = match self.fetcher.fetch(company_id, category, &request) {
                Ok(documents) => documents,
                Err(e) => {
                    warn!("{} {}: fetch failed: {}", company_id, category, e);
                    report.categories.push(CategoryReport {
                        category,
                        fetch_error: Some(e.to_string()),
                        ingestion: IngestionReport {
                            company_id: company_id.to_string(),
                            category,
                            documents: Vec::new(),
                        },
                    });
                    continue;
                }
            };

            info!(
                "{} {}: {} documents fetched",
                company_id,
                category,
                documents.len()
            );
            on_document(documents.len(), None);

            let ingestion = ingestor.ingest_with(company_id, category, &documents, overwrite, |line| {
                on_document(documents.len(), Some(line));
            });

            report.categories.push(CategoryReport {
                category,
                fetch_error: None,
                ingestion,
            });
        }

        report
    }
}
