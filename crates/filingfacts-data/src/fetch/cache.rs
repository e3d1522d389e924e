//! Local filing cache on disk.
//!
//! Layout, one directory per filing:
//!
//! ```text
//! {root}/{ticker}/{form}/{accession}/full-submission.txt
//! {root}/{ticker}/{form}/{accession}/filing-date
//! ```
//!
//! `form` is `10-K` or `10-Q`. The `filing-date` sidecar holds the filing
//! date as `YYYY-MM-DD` and is optional; caches filled by other tools
//! usually lack it.

use super::{DocumentFetcher, FetchRequest};
use crate::error::{DataError, Result};
use chrono::NaiveDate;
use filingfacts_extract::{FilingCategory, RawDocument};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the submission text inside an accession directory.
pub const SUBMISSION_FILE: &str = "full-submission.txt";

/// File name of the filing-date sidecar inside an accession directory.
pub const FILING_DATE_FILE: &str = "filing-date";

/// A cached filing found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CachedFiling {
    accession: String,
    filing_date: Option<NaiveDate>,
    path: PathBuf,
}

/// [`DocumentFetcher`] over a local directory of downloaded submissions.
#[derive(Debug, Clone)]
pub struct FilingCache {
    root: PathBuf,
}

impl FilingCache {
    /// Create a cache rooted at `root`. The directory need not exist yet.
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding one company's filings of one category.
    pub fn category_dir(&self, company_id: &str, category: FilingCategory) -> PathBuf {
        self.root.join(company_id).join(category.form())
    }

    /// Directory of a single filing.
    pub fn filing_dir(&self, company_id: &str, category: FilingCategory, accession: &str) -> PathBuf {
        self.category_dir(company_id, category).join(accession)
    }

    /// Returns true if the submission text of a filing is already cached.
    pub fn contains(&self, company_id: &str, category: FilingCategory, accession: &str) -> bool {
        self.filing_dir(company_id, category, accession)
            .join(SUBMISSION_FILE)
            .is_file()
    }

    /// Write a filing into the cache, replacing any previous copy.
    ///
    /// Returns the path of the written submission file.
    pub fn store(
        &self,
        company_id: &str,
        category: FilingCategory,
        accession: &str,
        filing_date: Option<NaiveDate>,
        content: &[u8],
    ) -> Result<PathBuf> {
        let dir = self.filing_dir(company_id, category, accession);
        fs::create_dir_all(&dir)?;

        let path = dir.join(SUBMISSION_FILE);
        fs::write(&path, content)?;

        if let Some(date) = filing_date {
            fs::write(dir.join(FILING_DATE_FILE), date.format("%Y-%m-%d").to_string())?;
        }

        Ok(path)
    }

    /// List cached filings, oldest first, after applying the request bounds.
    fn list(
        &self,
        company_id: &str,
        category: FilingCategory,
        request: &FetchRequest,
    ) -> Result<Vec<CachedFiling>> {
        let dir = self.category_dir(company_id, category);
        if !dir.is_dir() {
            return Err(DataError::Fetch(format!(
                "no cached {} filings for {} at {}",
                category.form(),
                company_id,
                dir.display()
            )));
        }

        let mut filings = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let accession = entry.file_name().to_string_lossy().into_owned();

            if accession.starts_with('.') || !entry.file_type()?.is_dir() {
                continue;
            }

            let path = entry.path().join(SUBMISSION_FILE);
            if !path.is_file() {
                warn!("{}: no {} in {}", company_id, SUBMISSION_FILE, entry.path().display());
                continue;
            }

            let filing_date = read_filing_date(&entry.path());
            if request.has_date_bounds() {
                match filing_date {
                    Some(date) if request.admits(date) => {}
                    Some(_) => continue,
                    None => {
                        debug!("{}: {} has no filing date, excluded by date bounds", company_id, accession);
                        continue;
                    }
                }
            }

            filings.push(CachedFiling {
                accession,
                filing_date,
                path,
            });
        }

        filings.sort_by(|a, b| {
            a.filing_date
                .cmp(&b.filing_date)
                .then_with(|| a.accession.cmp(&b.accession))
        });

        if let Some(limit) = request.limit {
            let skip = filings.len().saturating_sub(limit);
            filings.drain(..skip);
        }

        Ok(filings)
    }
}

fn read_filing_date(filing_dir: &Path) -> Option<NaiveDate> {
    let text = fs::read_to_string(filing_dir.join(FILING_DATE_FILE)).ok()?;
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

impl DocumentFetcher for FilingCache {
    fn fetch(
        &self,
        company_id: &str,
        category: FilingCategory,
        request: &FetchRequest,
    ) -> Result<Vec<RawDocument>> {
        let filings = self.list(company_id, category, request)?;

        let mut documents = Vec::with_capacity(filings.len());
        for filing in filings {
            match fs::read(&filing.path) {
                Ok(content) => documents.push(RawDocument::new(
                    company_id,
                    category,
                    filing.accession,
                    content,
                )),
                Err(e) => warn!("{}: failed to read {}: {}", company_id, filing.path.display(), e),
            }
        }

        debug!(
            "{}: fetched {} {} documents from {}",
            company_id,
            documents.len(),
            category.form(),
            self.root.display()
        );

        Ok(documents)
    }
}
