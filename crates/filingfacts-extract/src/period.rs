//! Period-end date resolution.

use crate::model::{FilingCategory, PeriodKey};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

static ENDED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bended\b\s*:?").expect("valid regex"));

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]{3,9})\.?\s+(\d{1,2})\s*,?\s*(\d{4})\b").expect("valid regex")
});

static SLASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("valid regex"));

static COMPACT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})(\d{2})(\d{2})\b").expect("valid regex"));

/// Calendar quarter (1-4) containing a month (1-12).
///
/// Out-of-range months are clamped.
pub const fn quarter_of(month: u32) -> u8 {
    let month = if month < 1 {
        1
    } else if month > 12 {
        12
    } else {
        month
    };
    ((month - 1) / 3 + 1) as u8
}

/// Resolve anchor text such as "For the Quarter Ended March 31, 2023" to a
/// period key.
///
/// Returns `None` when no date can be read from the text.
pub fn resolve(text: &str, category: FilingCategory) -> Option<PeriodKey> {
    parse_period_end(text).map(|date| PeriodKey::from_date(date, category))
}

/// Parse the period-end date out of free text.
///
/// Text after the word "ended" is preferred. Within it an 8-digit
/// `20230331` date wins over the long forms `March 31, 2023`,
/// `Sept. 30 2023` and `3/31/2023`.
pub fn parse_period_end(text: &str) -> Option<NaiveDate> {
    let tail = ENDED.find(text).map_or(text, |m| &text[m.end()..]);
    parse_date(tail).or_else(|| parse_date(text))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let compact = COMPACT.captures_iter(text).find_map(|caps| {
        NaiveDate::from_ymd_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, caps[3].parse().ok()?)
    });
    if compact.is_some() {
        return compact;
    }

    let named = MONTH_DAY_YEAR.captures_iter(text).find_map(|caps| {
        let month = month_number(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    });
    if named.is_some() {
        return named;
    }

    SLASHED.captures_iter(text).find_map(|caps| {
        NaiveDate::from_ymd_opt(caps[3].parse().ok()?, caps[1].parse().ok()?, caps[2].parse().ok()?)
    })
}

/// Month number for a full or abbreviated English month name.
fn month_number(word: &str) -> Option<u32> {
    let word = word.to_ascii_lowercase();
    if word.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| name.starts_with(&word))
        .map(|index| index as u32 + 1)
}
