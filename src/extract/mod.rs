// src/extract/mod.rs
//! Recover a header row and records from pasted clipboard content.
//!
//! Each strategy implements [`Extractor`] and either produces a
//! [`ParsedTable`] or declines. The [`dispatch::Dispatcher`] walks an ordered
//! list of strategies and the first one that parses wins:
//!
//! ```text
//! ClipboardPayload → Dispatcher → markup::MarkupExtractor
//!                              ↘ delimited::DelimitedExtractor
//!                  → Outcome::{Parsed, Failed, Cleared}
//! ```
//!
//! Extractors never return errors. A strategy that does not fit its input
//! reports [`Extraction::Declined`] and the dispatcher moves on.

pub mod delimited;
pub mod dispatch;
pub mod markup;

use crate::table::ParsedTable;

pub use delimited::{Delimiter, DelimitedExtractor};
pub use dispatch::{Dispatcher, Outcome, ParseFailure};
pub use markup::MarkupExtractor;

/// Which representation of the clipboard an extractor reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    PlainText,
    Markup,
}

/// Result of one strategy applied to one input.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// The strategy does not apply to this input.
    Declined,
    Parsed(ParsedTable),
}

impl Extraction {
    pub fn into_table(self) -> Option<ParsedTable> {
        match self {
            Extraction::Parsed(table) => Some(table),
            Extraction::Declined => None,
        }
    }
}

/// A strategy that turns one payload representation into a table.
pub trait Extractor {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    fn kind(&self) -> PayloadKind;

    fn extract(&self, input: &str) -> Extraction;
}

/// The representations a paste or edit event carries.
///
/// `plain` is always present (possibly empty). `markup` is only set when the
/// source clipboard offered an HTML flavour.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub plain: String,
    pub markup: Option<String>,
}

impl ClipboardPayload {
    /// A typed edit: plain text only.
    pub fn text(plain: impl Into<String>) -> Self {
        Self {
            plain: plain.into(),
            markup: None,
        }
    }

    /// A paste that carried both flavours. An empty markup string counts as absent.
    pub fn with_markup(plain: impl Into<String>, markup: impl Into<String>) -> Self {
        let markup = markup.into();
        Self {
            plain: plain.into(),
            markup: (!markup.is_empty()).then_some(markup),
        }
    }

    /// The representation an extractor of `kind` should read, if present.
    pub fn get(&self, kind: PayloadKind) -> Option<&str> {
        match kind {
            PayloadKind::PlainText => Some(self.plain.as_str()),
            PayloadKind::Markup => self.markup.as_deref().filter(|m| !m.is_empty()),
        }
    }

    /// True when nothing at all was pasted. Whitespace-only text is not
    /// empty: it goes to the extractors and fails there.
    pub fn is_empty(&self) -> bool {
        self.plain.is_empty() && self.get(PayloadKind::Markup).is_none()
    }
}
