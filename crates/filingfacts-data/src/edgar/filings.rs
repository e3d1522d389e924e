//! SEC EDGAR submissions data.
//!
//! The submissions API returns a company's recent filings as parallel
//! arrays; [`CompanyFilings::filings_for`] turns them into [`FilingInfo`]
//! records for one filing category.

use crate::error::{DataError, Result};
use crate::fetch::FetchRequest;
use chrono::NaiveDate;
use filingfacts_extract::FilingCategory;
use serde::Deserialize;

/// Pad CIK to 10 digits as required by SEC.
///
/// ```
/// # use filingfacts_data::edgar::pad_cik;
/// assert_eq!(pad_cik("320193"), "0000320193");
/// ```
pub fn pad_cik(cik: &str) -> String {
    format!("{:0>10}", cik.trim())
}

/// Company filings data from the SEC EDGAR submissions API.
#[derive(Debug, Clone, Deserialize)]
pub struct CompanyFilings {
    /// Central Index Key
    pub cik: String,
    /// Company name
    pub name: String,
    /// Filing history
    pub filings: FilingHistory,
}

/// Container for filing history data.
#[derive(Debug, Clone, Deserialize)]
pub struct FilingHistory {
    /// Recent filings
    pub recent: RecentFilings,
}

/// Recent filings data.
///
/// Each index across the arrays corresponds to a single filing, most
/// recent first.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFilings {
    /// Accession numbers (unique filing identifiers)
    pub accession_number: Vec<String>,
    /// Form types (e.g., "10-K", "10-Q", "8-K")
    pub form: Vec<String>,
    /// Filing dates in YYYY-MM-DD format
    pub filing_date: Vec<String>,
}

/// One filing of interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingInfo {
    /// Accession number (unique filing identifier)
    pub accession_number: String,
    /// Filing category derived from the form type
    pub category: FilingCategory,
    /// Filing date
    pub filing_date: NaiveDate,
}

impl CompanyFilings {
    /// Filings of one category admitted by `request`, most recent first.
    ///
    /// Amendments (`10-K/A`, `10-Q/A`) are not included. Entries with an
    /// unreadable filing date are skipped.
    ///
    /// Only `filings.recent` is read. It holds roughly the last 1000 filings
    /// of any form; older filings paged out to `filings.files` are not
    /// reachable, so an `after` bound further back than that window yields
    /// fewer filings than exist.
    pub fn filings_for(&self, category: FilingCategory, request: &FetchRequest) -> Vec<FilingInfo> {
        let recent = &self.filings.recent;
        let filings = (0..recent.form.len())
            .filter(|&i| recent.form[i] == category.form())
            .filter_map(|i| self.filing_at_index(i).ok())
            .filter(|filing| request.admits(filing.filing_date));

        match request.limit {
            Some(limit) => filings.take(limit).collect(),
            None => filings.collect(),
        }
    }

    /// Extract filing information at a specific index.
    fn filing_at_index(&self, idx: usize) -> Result<FilingInfo> {
        let recent = &self.filings.recent;

        let form = recent
            .form
            .get(idx)
            .ok_or_else(|| DataError::Parse(format!("No filing at index {}", idx)))?;
        let category = FilingCategory::from_form(form)
            .ok_or_else(|| DataError::Parse(format!("Unsupported form type: {}", form)))?;

        let accession_number = recent
            .accession_number
            .get(idx)
            .ok_or_else(|| DataError::Parse(format!("No accession number at index {}", idx)))?;

        let filing_date = recent
            .filing_date
            .get(idx)
            .ok_or_else(|| DataError::Parse(format!("No filing date at index {}", idx)))?;
        let filing_date = NaiveDate::parse_from_str(filing_date, "%Y-%m-%d")
            .map_err(|e| DataError::Parse(format!("Invalid filing date: {}", e)))?;

        Ok(FilingInfo {
            accession_number: accession_number.clone(),
            category,
            filing_date,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBMISSIONS: &str = r#"{
        "cik": "320193",
        "name": "Apple Inc.",
        "filings": {
            "recent": {
                "accessionNumber": [
                    "0000320193-24-000006",
                    "0000320193-23-000106",
                    "0000320193-23-000077",
                    "0000320193-23-000064",
                    "0000320193-23-000063",
                    "0000320193-23-000006"
                ],
                "form": ["8-K", "10-K", "10-Q", "10-Q", "10-K/A", "10-Q"],
                "filingDate": ["2024-02-01", "2023-11-03", "2023-08-04", "2023-05-05", "2023-04-01", "not-a-date"],
                "reportDate": ["2024-02-01", "2023-09-30", "2023-07-01", "2023-04-01", "2022-09-24", "2022-12-31"]
            },
            "files": [
                {"name": "CIK0000320193-submissions-001.json", "filingCount": 1200, "filingFrom": "1994-01-26", "filingTo": "2014-10-27"}
            ]
        }
    }"#;

    fn filings() -> CompanyFilings {
        serde_json::from_str(SUBMISSIONS).unwrap()
    }

    fn accessions(filings: &[FilingInfo]) -> Vec<&str> {
        filings.iter().map(|f| f.accession_number.as_str()).collect()
    }

    #[test]
    fn test_pad_cik() {
        assert_eq!(pad_cik("320193"), "0000320193");
        assert_eq!(pad_cik("1234"), "0000001234");
        assert_eq!(pad_cik("1234567890"), "1234567890");
    }

    #[test]
    fn test_filings_for_category() {
        let filings = filings();

        let annual = filings.filings_for(FilingCategory::Annual, &FetchRequest::all());
        assert_eq!(accessions(&annual), vec!["0000320193-23-000106"]);
        assert_eq!(annual[0].category, FilingCategory::Annual);

        let quarterly = filings.filings_for(FilingCategory::Quarterly, &FetchRequest::all());
        assert_eq!(
            accessions(&quarterly),
            vec!["0000320193-23-000077", "0000320193-23-000064"]
        );
        assert_eq!(quarterly[1].filing_date, NaiveDate::from_ymd_opt(2023, 5, 5).unwrap());
    }

    #[test]
    fn test_filings_for_limit_and_bounds() {
        let filings = filings();

        let latest = filings.filings_for(FilingCategory::Quarterly, &FetchRequest::latest(1));
        assert_eq!(accessions(&latest), vec!["0000320193-23-000077"]);

        let request = FetchRequest::all().with_before(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
        let early = filings.filings_for(FilingCategory::Quarterly, &request);
        assert_eq!(accessions(&early), vec!["0000320193-23-000064"]);
    }

    #[test]
    fn test_paged_history_is_not_read() {
        let filings = filings();
        let request = FetchRequest::all().with_before(NaiveDate::from_ymd_opt(2014, 12, 31).unwrap());

        assert!(filings.filings_for(FilingCategory::Annual, &request).is_empty());
    }
}
