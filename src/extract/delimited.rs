// src/extract/delimited.rs
use tracing::{debug, trace};

use super::{Extraction, Extractor, PayloadKind};
use crate::table::{HeaderList, ParsedTable};

/// Field separator for a plain-text paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Tab,
    Comma,
}

impl Delimiter {
    /// Tab if the line contains one, comma otherwise. Only the header line is inspected.
    pub fn detect(line: &str) -> Self {
        if line.contains('\t') {
            Delimiter::Tab
        } else {
            Delimiter::Comma
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Delimiter::Tab => '\t',
            Delimiter::Comma => ',',
        }
    }

    /// Split and trim every field.
    pub fn split(self, line: &str) -> Vec<String> {
        line.split(self.as_char())
            .map(|field| field.trim().to_string())
            .collect()
    }
}

/// Tab- or comma-separated text with the first non-blank line as header.
///
/// No quoting rules are applied: a comma inside quotes still splits.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelimitedExtractor;

impl Extractor for DelimitedExtractor {
    fn name(&self) -> &'static str {
        "delimited"
    }

    fn kind(&self) -> PayloadKind {
        PayloadKind::PlainText
    }

    fn extract(&self, input: &str) -> Extraction {
        let mut lines = input.lines().map(str::trim).filter(|line| !line.is_empty());

        let Some(header_line) = lines.next() else {
            debug!("no non-blank lines");
            return Extraction::Declined;
        };

        let delimiter = Delimiter::detect(header_line);
        let headers: HeaderList = delimiter.split(header_line);
        if headers.is_empty() || (headers.len() == 1 && headers[0].is_empty()) {
            debug!("header line yields no columns");
            return Extraction::Declined;
        }
        trace!(?delimiter, columns = headers.len(), "header row");

        let table = ParsedTable::from_cells(headers, lines.map(|line| delimiter.split(line)));
        debug!(
            ?delimiter,
            columns = table.headers.len(),
            rows = table.rows.len(),
            "parsed delimited text"
        );
        Extraction::Parsed(table)
    }
}
