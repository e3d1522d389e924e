//! Batch ingestion of raw documents into a fact store.
//!
//! Every document in a batch gets exactly one [`DocumentOutcome`]. A bad
//! document never stops the batch, and ingesting the same document twice
//! stores one fact.

use filingfacts_data::FactStore;
use filingfacts_extract::{Extractor, FilingCategory, PeriodKey, RawDocument};
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum DocumentOutcome {
    /// A new fact was stored (or replaced, when overwriting)
    Inserted,
    /// A fact with the same natural key was already stored
    SkippedDuplicate,
    /// Extraction or storage failed
    Failed(String),
}

impl fmt::Display for DocumentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inserted => f.write_str("inserted"),
            Self::SkippedDuplicate => f.write_str("skipped (duplicate)"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Per-document line of an [`IngestionReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentReport {
    /// Source document identifier
    pub document_id: String,
    /// Resolved period, if extraction got that far
    pub period_key: Option<PeriodKey>,
    /// Outcome for this document
    pub outcome: DocumentOutcome,
}

/// Result of ingesting one batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    /// Company the batch belongs to
    pub company_id: String,
    /// Filing category of the batch
    pub category: FilingCategory,
    /// One entry per input document, in input order
    pub documents: Vec<DocumentReport>,
}

impl IngestionReport {
    fn count(&self, pred: impl Fn(&DocumentOutcome) -> bool) -> usize {
        self.documents.iter().filter(|d| pred(&d.outcome)).count()
    }

    /// Number of documents in the batch.
    pub fn total(&self) -> usize {
        self.documents.len()
    }

    /// Number of stored facts.
    pub fn inserted(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Inserted))
    }

    /// Number of documents skipped as duplicates.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::SkippedDuplicate))
    }

    /// Number of failed documents.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Failed(_)))
    }

    /// Failed documents with their reasons.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents.iter().filter_map(|d| match &d.outcome {
            DocumentOutcome::Failed(reason) => Some((d.document_id.as_str(), reason.as_str())),
            _ => None,
        })
    }
}

/// Runs documents through an [`Extractor`] into a [`FactStore`].
#[derive(Debug)]
pub struct Ingestor<'a, S: ?Sized> {
    extractor: &'a Extractor,
    store: &'a S,
}

impl<'a, S: FactStore + ?Sized> Ingestor<'a, S> {
    /// Create an ingestor over a shared extractor and store.
    pub const fn new(extractor: &'a Extractor, store: &'a S) -> Self {
        Self { extractor, store }
    }

    /// Ingest a batch.
    ///
    /// Without `overwrite`, a document whose natural key is already stored is
    /// skipped; with it, the stored fact is replaced.
    pub fn ingest(
        &self,
        company_id: &str,
        category: FilingCategory,
        documents: &[RawDocument],
        overwrite: bool,
    ) -> IngestionReport {
        self.ingest_with(company_id, category, documents, overwrite, |_| {})
    }

    /// Ingest a batch, calling `on_document` after each document.
    pub fn ingest_with<F>(
        &self,
        company_id: &str,
        category: FilingCategory,
        documents: &[RawDocument],
        overwrite: bool,
        mut on_document: F,
    ) -> IngestionReport
    where
        F: FnMut(&DocumentReport),
    {
        let mut report = IngestionReport {
            company_id: company_id.to_string(),
            category,
            documents: Vec::with_capacity(documents.len()),
        };

        for doc in documents {
            let line = self.ingest_one(company_id, category, doc, overwrite);
            on_document(&line);
            report.documents.push(line);
        }

        info!(
            "{} {}: {} documents, {} inserted, {} skipped, {} failed",
            company_id,
            category,
            report.total(),
            report.inserted(),
            report.skipped(),
            report.failed()
        );

        report
    }

    fn ingest_one(
        &self,
        company_id: &str,
        category: FilingCategory,
        doc: &RawDocument,
        overwrite: bool,
    ) -> DocumentReport {
        let document_id = doc.document_id().to_string();
        let failed = |period_key, reason: String| {
            warn!("{} {} {}: {}", company_id, category, doc.document_id(), reason);
            DocumentReport {
                document_id: doc.document_id().to_string(),
                period_key,
                outcome: DocumentOutcome::Failed(reason),
            }
        };

        if doc.company_id() != company_id || doc.category() != category {
            return failed(
                None,
                format!(
                    "document belongs to {} {}, not {} {}",
                    doc.company_id(),
                    doc.category(),
                    company_id,
                    category
                ),
            );
        }

        let fact = match self.extractor.extract(doc) {
            Ok(fact) => fact,
            Err(e) => return failed(None, e.to_string()),
        };
        let period_key = Some(fact.period_key());

        if !overwrite {
            match self.store.exists(fact.key()) {
                Ok(true) => {
                    debug!("{}: already stored, skipping", fact.key());
                    return DocumentReport {
                        document_id,
                        period_key,
                        outcome: DocumentOutcome::SkippedDuplicate,
                    };
                }
                Ok(false) => {}
                Err(e) => return failed(period_key, e.to_string()),
            }
        }

        let stored = if overwrite {
            self.store.upsert(&fact)
        } else {
            self.store.insert(&fact)
        };

        let outcome = match stored {
            Ok(()) => DocumentOutcome::Inserted,
            Err(e) if e.is_duplicate_key() => {
                debug!("{}: stored concurrently, skipping", fact.key());
                DocumentOutcome::SkippedDuplicate
            }
            Err(e) => return failed(period_key, e.to_string()),
        };

        DocumentReport {
            document_id,
            period_key,
            outcome,
        }
    }
}
