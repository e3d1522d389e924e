//! Document structure scanning.
//!
//! A [`ParsedTree`] is built once per document from its raw markup. The
//! scanner then answers two questions about it: where is the period-end
//! anchor phrase, and which tables does the document contain.
//!
//! EDGAR `full-submission.txt` files are SGML envelopes (`<SEC-DOCUMENT>`,
//! `<DOCUMENT>`, `<TEXT>`) around HTML; the HTML parser accepts both, so the
//! envelope tags simply become unknown elements in the tree.

use crate::config::{AnchorConfig, ReportingUnit};
use crate::error::{ExtractError, Result};
use crate::labels::tolerant_pattern;
use crate::model::{FilingCategory, RawDocument};
use regex::Regex;
use scraper::{ElementRef, Html};
use std::borrow::Cow;
use std::sync::LazyLock;

/// Share of control characters (in percent) above which content is treated as binary.
const MAX_CONTROL_PERCENT: usize = 5;

/// Elements whose text is returned as the anchor's "full text".
const BLOCK_ELEMENTS: [&str; 14] = [
    "p", "div", "td", "th", "li", "h1", "h2", "h3", "h4", "h5", "h6", "center", "caption", "pre",
];

/// Elements searched when the anchor phrase is split across text nodes.
const PHRASE_ELEMENTS: [&str; 15] = [
    "p", "td", "th", "li", "h1", "h2", "h3", "h4", "h5", "h6", "center", "caption", "span",
    "font", "b",
];

static DOCUMENT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<document>").expect("valid regex"));

static DOCUMENT_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</document>").expect("valid regex"));

static CONFORMED_PERIOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)conformed\s+period\s+of\s+report:\s*(\d{8})").expect("valid regex")
});

static STATED_UNIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\(\s*(?:[a-z$.,]+\s+)*in\s+(thousands|millions|billions)\b")
        .expect("valid regex")
});

/// In-memory structure of one document's markup.
///
/// Owned by a single extraction call and dropped when it returns.
pub struct ParsedTree {
    html: Html,
}

impl std::fmt::Debug for ParsedTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedTree")
            .field("tables", &all_tables(self).count())
            .finish_non_exhaustive()
    }
}

impl ParsedTree {
    /// Build the tree for a raw document.
    ///
    /// Content that is not valid UTF-8 is decoded as Latin-1, which is what
    /// older EDGAR submissions use.
    ///
    /// # Errors
    /// Returns [`ExtractError::Parse`] when the content cannot be structurally
    /// parsed at all: it is empty, binary, a truncated submission, or has no
    /// markup.
    pub fn from_document(doc: &RawDocument) -> Result<Self> {
        let text = decode(doc.content());
        Self::parse(doc.document_id(), &text)
    }

    /// Build the tree from already decoded text.
    pub fn parse(document_id: &str, text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Err(ExtractError::parse(document_id, "document is empty"));
        }

        if looks_binary(text) {
            return Err(ExtractError::parse(
                document_id,
                "content looks binary or corrupted",
            ));
        }

        let opened = DOCUMENT_OPEN.find_iter(text).count();
        let closed = DOCUMENT_CLOSE.find_iter(text).count();
        if opened > closed {
            return Err(ExtractError::parse(
                document_id,
                format!(
                    "submission is truncated: {} <DOCUMENT> sections opened, {} closed",
                    opened, closed
                ),
            ));
        }

        let html = Html::parse_document(text);
        let has_markup = html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .any(|e| !matches!(e.value().name(), "html" | "head" | "body"));

        if !has_markup {
            return Err(ExtractError::parse(document_id, "no markup elements found"));
        }

        Ok(Self { html })
    }

    /// Text nodes in document order with their parent element, skipping
    /// script and style content.
    fn text_nodes(&self) -> impl Iterator<Item = (Option<ElementRef<'_>>, &str)> {
        self.html.tree.root().descendants().filter_map(|node| {
            let text = node.value().as_text()?;
            let parent = node.parent().and_then(ElementRef::wrap);
            if parent.is_some_and(|p| matches!(p.value().name(), "script" | "style")) {
                return None;
            }
            Some((parent, &**text))
        })
    }
}

fn decode(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => Cow::Owned(bytes.iter().map(|&b| b as char).collect()),
    }
}

fn looks_binary(text: &str) -> bool {
    let mut total = 0usize;
    let mut control = 0usize;
    for c in text.chars() {
        total += 1;
        if c.is_control() && !matches!(c, '\n' | '\r' | '\t' | '\u{c}') {
            control += 1;
        }
    }
    control * 100 > total * MAX_CONTROL_PERCENT
}

/// Collapse runs of whitespace (including non-breaking spaces) to single spaces.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

/// One tabular region of a document.
#[derive(Debug, Clone, Copy)]
pub struct TableRegion<'a> {
    element: ElementRef<'a>,
}

impl<'a> TableRegion<'a> {
    /// Rows in document order, each as its cell texts.
    ///
    /// Cell text has whitespace collapsed. Rows of a nested table belong to
    /// the nested table, not to this one.
    pub fn rows(&self) -> impl Iterator<Item = Vec<String>> + 'a {
        let table = self.element;
        self.element
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "tr")
            .filter(move |row| {
                row.ancestors()
                    .filter_map(ElementRef::wrap)
                    .find(|e| e.value().name() == "table")
                    .is_some_and(|t| t == table)
            })
            .map(|row| {
                row.children()
                    .filter_map(ElementRef::wrap)
                    .filter(|cell| matches!(cell.value().name(), "td" | "th"))
                    .map(element_text)
                    .collect()
            })
    }
}

/// Every table in the document, in document order.
///
/// The sequence is lazy and finite; a document without tables yields nothing.
pub fn all_tables(tree: &ParsedTree) -> impl Iterator<Item = TableRegion<'_>> {
    tree.html
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "table")
        .map(|element| TableRegion { element })
}

/// Locates structural landmarks in a [`ParsedTree`].
#[derive(Debug)]
pub struct DocumentScanner {
    annual: Vec<Regex>,
    quarterly: Vec<Regex>,
}

impl DocumentScanner {
    /// Compile the anchor phrases.
    pub fn new(anchors: &AnchorConfig) -> Result<Self> {
        let compile = |phrases: &[String]| -> Result<Vec<Regex>> {
            phrases
                .iter()
                .filter(|p| !p.trim().is_empty())
                .map(|p| tolerant_pattern(p))
                .collect()
        };

        Ok(Self {
            annual: compile(&anchors.annual)?,
            quarterly: compile(&anchors.quarterly)?,
        })
    }

    fn anchors(&self, category: FilingCategory) -> &[Regex] {
        match category {
            FilingCategory::Annual => &self.annual,
            FilingCategory::Quarterly => &self.quarterly,
        }
    }

    /// Find the text carrying the period-end anchor phrase for a category.
    ///
    /// The first text node matching any anchor phrase wins, and the full text
    /// of its enclosing block element is returned so a date in a sibling span
    /// is kept. When the phrase is split across inline elements no single
    /// text node matches; the first paragraph-level element whose text
    /// matches is returned instead.
    pub fn find_period_anchor(&self, tree: &ParsedTree, category: FilingCategory) -> Option<String> {
        let anchors = self.anchors(category);
        if anchors.is_empty() {
            return None;
        }
        let is_anchor = |text: &str| anchors.iter().any(|re| re.is_match(text));

        if let Some((parent, text)) = tree.text_nodes().find(|(_, text)| is_anchor(text)) {
            let block = parent.and_then(|parent| {
                std::iter::once(parent)
                    .chain(parent.ancestors().filter_map(ElementRef::wrap))
                    .take_while(|e| !matches!(e.value().name(), "body" | "html"))
                    .find(|e| BLOCK_ELEMENTS.contains(&e.value().name()))
            });

            return Some(block.map_or_else(|| collapse_whitespace(text), element_text));
        }

        tree.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|e| PHRASE_ELEMENTS.contains(&e.value().name()))
            .map(element_text)
            .find(|text| is_anchor(text))
    }

    /// The `CONFORMED PERIOD OF REPORT` value from an EDGAR submission header.
    pub fn find_conformed_period(&self, tree: &ParsedTree) -> Option<String> {
        tree.text_nodes().find_map(|(_, text)| {
            CONFORMED_PERIOD
                .captures(text)
                .map(|caps| caps[1].to_string())
        })
    }

    /// The first reporting-unit statement such as "(In millions, except per share data)".
    pub fn find_stated_unit(&self, tree: &ParsedTree) -> Option<ReportingUnit> {
        tree.text_nodes().find_map(|(_, text)| {
            STATED_UNIT
                .captures(text)
                .and_then(|caps| ReportingUnit::from_word(&caps[1]))
        })
    }
}
