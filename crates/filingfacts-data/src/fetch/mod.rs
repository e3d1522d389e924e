//! Raw document retrieval.
//!
//! A [`DocumentFetcher`] produces the raw documents of one company and
//! filing category. The extraction engine never talks to the network or
//! the filesystem itself; it only sees what a fetcher hands over.

pub mod cache;

pub use cache::FilingCache;

use crate::error::Result;
use chrono::NaiveDate;
use filingfacts_extract::{FilingCategory, RawDocument};

/// Bounds on which filings a fetch returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchRequest {
    /// Keep only the most recent N filings
    pub limit: Option<usize>,
    /// Keep filings filed on or after this date
    pub after: Option<NaiveDate>,
    /// Keep filings filed on or before this date
    pub before: Option<NaiveDate>,
}

impl FetchRequest {
    /// Request every available filing.
    pub const fn all() -> Self {
        Self {
            limit: None,
            after: None,
            before: None,
        }
    }

    /// Request the most recent `limit` filings.
    pub const fn latest(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            after: None,
            before: None,
        }
    }

    /// Restrict to filings filed on or after `date`.
    pub const fn with_after(mut self, date: NaiveDate) -> Self {
        self.after = Some(date);
        self
    }

    /// Restrict to filings filed on or before `date`.
    pub const fn with_before(mut self, date: NaiveDate) -> Self {
        self.before = Some(date);
        self
    }

    /// Returns true if a date bound is set.
    pub const fn has_date_bounds(&self) -> bool {
        self.after.is_some() || self.before.is_some()
    }

    /// Returns true if `date` lies within the date bounds.
    pub fn admits(&self, date: NaiveDate) -> bool {
        self.after.is_none_or(|after| date >= after) && self.before.is_none_or(|before| date <= before)
    }
}

/// Source of raw filing documents.
pub trait DocumentFetcher {
    /// Fetch the raw documents of one company and category, oldest first.
    ///
    /// # Errors
    /// Returns an error when nothing can be retrieved at all. Individual
    /// unreadable filings are skipped.
    fn fetch(
        &self,
        company_id: &str,
        category: FilingCategory,
        request: &FetchRequest,
    ) -> Result<Vec<RawDocument>>;
}
