// src/extract/dispatch.rs
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::{ClipboardPayload, DelimitedExtractor, Extraction, Extractor, MarkupExtractor};
use crate::table::ParsedTable;

/// Neither strategy recovered a table. Carries no detail beyond the message.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Could not parse input. Please paste valid HTML table code, or comma/tab-separated text with a header row.")]
pub struct ParseFailure;

/// What one input event resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing was pasted. Prior results are dropped and no error is shown.
    Cleared,
    Parsed(ParsedTable),
    Failed(ParseFailure),
}

/// Ordered list of strategies. The first one that parses wins.
pub struct Dispatcher {
    extractors: Vec<Box<dyn Extractor + Send + Sync>>,
}

impl Default for Dispatcher {
    /// Markup before plain text: table structure is better evidence of
    /// columns than a guessed delimiter.
    fn default() -> Self {
        Self::with_extractors(vec![
            Box::new(MarkupExtractor),
            Box::new(DelimitedExtractor),
        ])
    }
}

impl Dispatcher {
    pub fn with_extractors(extractors: Vec<Box<dyn Extractor + Send + Sync>>) -> Self {
        Self { extractors }
    }

    /// Resolve a payload into a fresh [`Outcome`]. Pure: the same payload always
    /// yields an equal outcome.
    #[instrument(level = "debug", skip_all, fields(plain_len = payload.plain.len(), has_markup = payload.markup.is_some()))]
    pub fn dispatch(&self, payload: &ClipboardPayload) -> Outcome {
        if payload.is_empty() {
            debug!("empty payload, clearing");
            return Outcome::Cleared;
        }

        for extractor in &self.extractors {
            let Some(input) = payload.get(extractor.kind()) else {
                debug!(extractor = extractor.name(), "payload has no input for extractor");
                continue;
            };
            match extractor.extract(input) {
                Extraction::Parsed(table) => {
                    info!(
                        extractor = extractor.name(),
                        columns = table.headers.len(),
                        rows = table.rows.len(),
                        "parsed paste"
                    );
                    return Outcome::Parsed(table);
                }
                Extraction::Declined => {
                    debug!(extractor = extractor.name(), "declined");
                }
            }
        }

        info!("no extractor could parse the paste");
        Outcome::Failed(ParseFailure)
    }
}

/// [`Dispatcher::dispatch`] with the default strategy order.
pub fn dispatch(plain: &str, markup: Option<&str>) -> Outcome {
    let payload = match markup {
        Some(markup) => ClipboardPayload::with_markup(plain, markup),
        None => ClipboardPayload::text(plain),
    };
    Dispatcher::default().dispatch(&payload)
}
