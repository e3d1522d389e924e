//! Core data model: raw documents in, normalized facts out.

use crate::error::{ExtractError, Result};
use crate::period::quarter_of;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Regulatory disclosure type of a filing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingCategory {
    /// Annual report (10-K)
    Annual,
    /// Quarterly report (10-Q)
    Quarterly,
}

impl FilingCategory {
    /// Both categories, annual first.
    pub const ALL: [Self; 2] = [Self::Annual, Self::Quarterly];

    /// Canonical lowercase name, also used as the stored representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarterly => "quarterly",
        }
    }

    /// SEC form type for this category.
    pub const fn form(&self) -> &'static str {
        match self {
            Self::Annual => "10-K",
            Self::Quarterly => "10-Q",
        }
    }

    /// Convert an SEC form type to a category.
    pub fn from_form(form: &str) -> Option<Self> {
        match form {
            "10-K" => Some(Self::Annual),
            "10-Q" => Some(Self::Quarterly),
            _ => None,
        }
    }
}

impl fmt::Display for FilingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingCategory {
    type Err = ExtractError;

    /// Accepts the canonical names as well as the SEC form types.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" | "10-k" | "10k" => Ok(Self::Annual),
            "quarterly" | "10-q" | "10q" => Ok(Self::Quarterly),
            _ => Err(ExtractError::UnknownCategory(s.to_string())),
        }
    }
}

/// One of the fixed headline metrics the engine extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetConcept {
    /// Total revenue (net sales)
    TotalRevenue,
    /// Net income (loss)
    NetIncome,
    /// Total assets
    TotalAssets,
    /// Total liabilities
    TotalLiabilities,
    /// Total stockholders' equity
    TotalStockholdersEquity,
}

impl TargetConcept {
    /// Every concept, in the order facts are reported.
    pub const ALL: [Self; 5] = [
        Self::TotalRevenue,
        Self::NetIncome,
        Self::TotalAssets,
        Self::TotalLiabilities,
        Self::TotalStockholdersEquity,
    ];

    /// Snake-case identifier, also the stored column name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TotalRevenue => "total_revenue",
            Self::NetIncome => "net_income",
            Self::TotalAssets => "total_assets",
            Self::TotalLiabilities => "total_liabilities",
            Self::TotalStockholdersEquity => "total_stockholders_equity",
        }
    }

    /// Human readable name.
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::TotalRevenue => "Total Revenue",
            Self::NetIncome => "Net Income",
            Self::TotalAssets => "Total Assets",
            Self::TotalLiabilities => "Total Liabilities",
            Self::TotalStockholdersEquity => "Total Stockholders Equity",
        }
    }
}

impl fmt::Display for TargetConcept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetConcept {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ExtractError::UnknownConcept(s.to_string()))
    }
}

/// Canonical identifier of the reporting period a fact belongs to.
///
/// Renders as `2023` for annual facts, `1Q2023` for quarterly facts and
/// `unknown` when the period end could not be resolved. Ordering is
/// chronological: quarters of a year sort before that year's annual key and
/// unknown periods sort last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum PeriodKey {
    /// Fiscal year of an annual report
    Annual {
        /// Four-digit year
        year: i32,
    },
    /// Calendar quarter of a quarterly report
    Quarterly {
        /// Quarter number, 1 through 4
        quarter: u8,
        /// Four-digit year
        year: i32,
    },
    /// Period end could not be parsed from the document
    Unknown,
}

impl PeriodKey {
    /// Marker used for facts whose period could not be resolved.
    pub const UNKNOWN_MARKER: &'static str = "unknown";

    /// Derive the key for a period-end date.
    pub fn from_date(date: NaiveDate, category: FilingCategory) -> Self {
        match category {
            FilingCategory::Annual => Self::Annual { year: date.year() },
            FilingCategory::Quarterly => Self::Quarterly {
                quarter: quarter_of(date.month()),
                year: date.year(),
            },
        }
    }

    /// Returns true unless this is the unknown-period marker.
    pub const fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Year of the period, if resolved.
    pub const fn year(&self) -> Option<i32> {
        match self {
            Self::Annual { year } | Self::Quarterly { year, .. } => Some(*year),
            Self::Unknown => None,
        }
    }

    const fn sort_key(&self) -> (i32, u8) {
        match self {
            Self::Quarterly { quarter, year } => (*year, *quarter),
            Self::Annual { year } => (*year, 5),
            Self::Unknown => (i32::MAX, u8::MAX),
        }
    }
}

impl Ord for PeriodKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for PeriodKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Annual { year } => write!(f, "{}", year),
            Self::Quarterly { quarter, year } => write!(f, "{}Q{}", quarter, year),
            Self::Unknown => f.write_str(Self::UNKNOWN_MARKER),
        }
    }
}

impl FromStr for PeriodKey {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || ExtractError::InvalidPeriodKey(s.to_string());
        let s = s.trim();

        if s.eq_ignore_ascii_case(Self::UNKNOWN_MARKER) {
            return Ok(Self::Unknown);
        }

        if let Some((quarter, year)) = s.split_once(['Q', 'q']) {
            let quarter: u8 = quarter.parse().map_err(|_| invalid())?;
            if !(1..=4).contains(&quarter) || year.len() != 4 {
                return Err(invalid());
            }
            let year = year.parse().map_err(|_| invalid())?;
            return Ok(Self::Quarterly { quarter, year });
        }

        if s.len() == 4 && s.bytes().all(|b| b.is_ascii_digit()) {
            let year = s.parse().map_err(|_| invalid())?;
            return Ok(Self::Annual { year });
        }

        Err(invalid())
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = ExtractError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// Immutable handle to one filing's raw content plus its metadata.
#[derive(Clone, PartialEq, Eq)]
pub struct RawDocument {
    company_id: String,
    category: FilingCategory,
    document_id: String,
    content: Vec<u8>,
}

impl RawDocument {
    /// Wrap raw filing content.
    ///
    /// `document_id` must be unique within `(company_id, category)`; for EDGAR
    /// filings the accession number is used.
    pub fn new(
        company_id: impl Into<String>,
        category: FilingCategory,
        document_id: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            company_id: company_id.into(),
            category,
            document_id: document_id.into(),
            content: content.into(),
        }
    }

    /// Company identifier (ticker).
    pub fn company_id(&self) -> &str {
        &self.company_id
    }

    /// Filing category.
    pub const fn category(&self) -> FilingCategory {
        self.category
    }

    /// Document identifier.
    pub fn document_id(&self) -> &str {
        &self.document_id
    }

    /// Raw content bytes.
    pub fn content(&self) -> &[u8] {
        &self.content
    }
}

impl fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawDocument")
            .field("company_id", &self.company_id)
            .field("category", &self.category)
            .field("document_id", &self.document_id)
            .field("content_len", &self.content.len())
            .finish()
    }
}

/// Natural key of a stored fact: at most one fact exists per key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FactKey {
    /// Company identifier (ticker)
    pub company_id: String,
    /// Filing category
    pub category: FilingCategory,
    /// Canonical period
    pub period_key: PeriodKey,
    /// Source document identifier
    pub document_id: String,
}

impl fmt::Display for FactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.company_id, self.category, self.period_key, self.document_id
        )
    }
}

/// Normalized record of headline financial facts from one filing.
///
/// Every [`TargetConcept`] has an entry; a concept that was not found is
/// `None`, which stays distinct from a reported zero. Values are whole
/// currency units after reporting-unit scaling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedFact {
    #[serde(flatten)]
    key: FactKey,
    values: BTreeMap<TargetConcept, Option<i64>>,
}

impl NormalizedFact {
    /// Assemble a fact. Concepts missing from `values` are recorded as absent.
    pub fn new(key: FactKey, values: impl IntoIterator<Item = (TargetConcept, Option<i64>)>) -> Self {
        let mut all: BTreeMap<TargetConcept, Option<i64>> =
            TargetConcept::ALL.into_iter().map(|c| (c, None)).collect();
        all.extend(values);
        Self { key, values: all }
    }

    /// Natural key.
    pub const fn key(&self) -> &FactKey {
        &self.key
    }

    /// Company identifier.
    pub fn company_id(&self) -> &str {
        &self.key.company_id
    }

    /// Filing category.
    pub const fn category(&self) -> FilingCategory {
        self.key.category
    }

    /// Canonical period.
    pub const fn period_key(&self) -> PeriodKey {
        self.key.period_key
    }

    /// Source document identifier.
    pub fn document_id(&self) -> &str {
        &self.key.document_id
    }

    /// Value of a concept, `None` when absent.
    pub fn value(&self, concept: TargetConcept) -> Option<i64> {
        self.values.get(&concept).copied().flatten()
    }

    /// All concept values in [`TargetConcept::ALL`] order.
    pub fn values(&self) -> impl Iterator<Item = (TargetConcept, Option<i64>)> + '_ {
        self.values.iter().map(|(c, v)| (*c, *v))
    }

    /// Number of concepts with a value.
    pub fn found_count(&self) -> usize {
        self.values.values().filter(|v| v.is_some()).count()
    }
}
