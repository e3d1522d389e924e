//! Table-cell value normalization.
//!
//! Financial statement cells arrive as display text: `$ 1,234`, `(567)`,
//! `1,234(a)`, `—`. [`normalize`] turns such text into a signed integer, or
//! `None` when the cell does not hold a number.

/// Currency symbols removed before parsing.
const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '¥'];

/// Thousands separators and footnote/typographic apostrophes removed before parsing.
const IGNORED_MARKS: [char; 4] = [',', '\'', '\u{2018}', '\u{2019}'];

/// Cell content that means "no value".
const PLACEHOLDERS: [&str; 7] = ["n/a", "na", "nm", "-", "\u{2013}", "\u{2014}", "*"];

/// Parse a raw cell into a signed integer.
///
/// Handles formats like:
/// - `"1,234,567"` -> `Some(1234567)`
/// - `"$(1,234)"` -> `Some(-1234)`
/// - `"(1,234"` -> `Some(-1234)` (closing parenthesis in the next cell)
/// - `"1,234\u{a0}(a)"` -> `Some(1234)` (footnote marker after the number)
/// - `"N/A"`, `"—"`, `""` -> `None`
/// - `"12.5%"`, `"Total revenue"` -> `None`
///
/// Only the first whitespace-delimited token is considered, and it must be
/// made of digits with an optional leading sign. This never panics.
pub fn normalize(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && !IGNORED_MARKS.contains(c))
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let trimmed = cleaned.trim();

    if trimmed.is_empty() || is_placeholder(trimmed) {
        return None;
    }

    let negative = trimmed.starts_with('(');
    let unwrapped = trimmed.replace(['(', ')'], " ");
    let token = unwrapped.split_whitespace().next()?;
    let value = parse_signed_digits(token)?;

    if negative { value.checked_neg() } else { Some(value) }
}

fn is_placeholder(s: &str) -> bool {
    PLACEHOLDERS.iter().any(|p| s.eq_ignore_ascii_case(p))
}

fn parse_signed_digits(token: &str) -> Option<i64> {
    let mut chars = token.chars();
    let (negative, digits) = match chars.next()? {
        '-' | '\u{2212}' => (true, chars.as_str()),
        '+' => (false, chars.as_str()),
        _ => (false, token),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let value: i64 = digits.parse().ok()?;
    if negative { value.checked_neg() } else { Some(value) }
}
