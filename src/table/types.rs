// src/table/types.rs

use indexmap::IndexMap;
use serde::Serialize;

/// Column names in display order. Empty and duplicate names are kept as-is.
pub type HeaderList = Vec<String>;

/// One data row keyed by header name, in header order.
pub type Record = IndexMap<String, String>;

/// Headers plus the rows recovered from a single paste.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Default)]
pub struct ParsedTable {
    pub headers: HeaderList,
    pub rows: Vec<Record>,
}

impl ParsedTable {
    /// Zip every row of `cells` against `headers`.
    pub fn from_cells<I, R, S>(headers: HeaderList, cells: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = cells
            .into_iter()
            .map(|row| build_record(&headers, row))
            .collect();
        Self { headers, rows }
    }
}

/// Map cell `i` to header `i`.
///
/// Missing trailing cells become `""` and surplus cells are dropped. A
/// duplicate header keeps its first position and takes the later value.
pub fn build_record<S: Into<String>>(
    headers: &[String],
    cells: impl IntoIterator<Item = S>,
) -> Record {
    let mut cells = cells.into_iter();
    let mut record = Record::with_capacity(headers.len());
    for header in headers {
        let value = cells.next().map(Into::into).unwrap_or_default();
        record.insert(header.clone(), value);
    }
    record
}
