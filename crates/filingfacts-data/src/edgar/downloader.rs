//! Fills a [`FilingCache`] from SEC EDGAR.

use super::client::EdgarClient;
use super::filings::FilingInfo;
use crate::error::Result;
use crate::fetch::{FetchRequest, FilingCache};
use filingfacts_extract::FilingCategory;
use log::{debug, info, warn};
use std::path::PathBuf;

/// Outcome of one download run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadSummary {
    /// Filings written to the cache
    pub downloaded: usize,
    /// Filings already cached and left untouched
    pub already_cached: usize,
    /// Filings whose download failed, with the reason
    pub failed: Vec<(String, String)>,
}

impl DownloadSummary {
    /// Total filings considered.
    pub fn total(&self) -> usize {
        self.downloaded + self.already_cached + self.failed.len()
    }
}

/// Downloads complete submission files into the local cache layout.
#[derive(Debug, Clone)]
pub struct EdgarDownloader {
    client: EdgarClient,
    cache: FilingCache,
}

impl EdgarDownloader {
    /// Create a downloader writing into `cache`.
    pub const fn new(client: EdgarClient, cache: FilingCache) -> Self {
        Self { client, cache }
    }

    /// The cache this downloader fills.
    pub const fn cache(&self) -> &FilingCache {
        &self.cache
    }

    /// Download a company's filings of one category.
    ///
    /// Filings already in the cache are not downloaded again. A failed
    /// filing is recorded in the summary and the run continues.
    ///
    /// # Errors
    /// Returns an error when the ticker cannot be resolved or the filing
    /// index cannot be retrieved.
    pub async fn download(
        &self,
        ticker: &str,
        category: FilingCategory,
        request: &FetchRequest,
    ) -> Result<DownloadSummary> {
        let cik = self.client.get_company_cik(ticker).await?;
        let filings = self.client.get_company_filings(&cik).await?;
        let wanted = filings.filings_for(category, request);

        info!(
            "{}: {} {} filings selected (CIK {})",
            ticker,
            wanted.len(),
            category.form(),
            cik
        );

        let mut summary = DownloadSummary::default();
        for filing in wanted {
            let accession = filing.accession_number.clone();
            if self.cache.contains(ticker, category, &accession) {
                debug!("{}: {} already cached", ticker, accession);
                summary.already_cached += 1;
                continue;
            }

            let content = match self.client.get_full_submission(&cik, &accession).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("{}: failed to download {}: {}", ticker, accession, e);
                    summary.failed.push((accession, e.to_string()));
                    continue;
                }
            };

            match self.cache_filing(ticker, &filing, &content) {
                Ok(path) => {
                    debug!("{}: cached {} ({} bytes)", ticker, path.display(), content.len());
                    summary.downloaded += 1;
                }
                Err(e) => {
                    warn!("{}: failed to cache {}: {}", ticker, filing.accession_number, e);
                    summary.failed.push((filing.accession_number, e.to_string()));
                }
            }
        }

        Ok(summary)
    }

    /// Write one downloaded submission, with its filing date, into the cache.
    fn cache_filing(&self, ticker: &str, filing: &FilingInfo, content: &[u8]) -> Result<PathBuf> {
        self.cache.store(
            ticker,
            filing.category,
            &filing.accession_number,
            Some(filing.filing_date),
            content,
        )
    }
}
