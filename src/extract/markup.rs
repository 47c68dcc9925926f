// src/extract/markup.rs
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, trace};

use super::{Extraction, Extractor, PayloadKind};
use crate::table::{HeaderList, ParsedTable};

static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("CSS selector for tables should be valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Head,
    Body,
    Foot,
}

/// The first `<table>` of an HTML fragment, as copied from a spreadsheet or web page.
#[derive(Debug, Default, Clone, Copy)]
pub struct MarkupExtractor;

impl Extractor for MarkupExtractor {
    fn name(&self) -> &'static str {
        "markup"
    }

    fn kind(&self) -> PayloadKind {
        PayloadKind::Markup
    }

    fn extract(&self, input: &str) -> Extraction {
        // html5ever recovers from any malformed input, so there is no parse error to handle.
        let doc = Html::parse_document(input);
        let Some(table) = doc.select(&TABLE_SELECTOR).next() else {
            debug!("no <table> element in markup");
            return Extraction::Declined;
        };

        let rows = table_rows(table);
        trace!(rows = rows.len(), "collected table rows");

        let head_cells: HeaderList = rows
            .iter()
            .filter(|(section, _)| *section == Section::Head)
            .flat_map(|(_, row)| cell_texts(*row))
            .collect();
        let has_head = !head_cells.is_empty();

        // Without head cells the header is the first row outside <thead>;
        // data rows follow it.
        let header_index = if has_head {
            None
        } else {
            rows.iter()
                .position(|(section, _)| *section != Section::Head)
                .or((!rows.is_empty()).then_some(0))
        };
        let headers: HeaderList = match header_index {
            Some(index) => cell_texts(rows[index].1),
            None => head_cells,
        };
        if headers.is_empty() {
            debug!("table has no header cells");
            return Extraction::Declined;
        }

        // The parser wraps bare <tr> elements in an implicit <tbody>, so body
        // rows are only trusted as data when a <thead> holds the header.
        let body: Vec<ElementRef<'_>> = rows
            .iter()
            .filter(|(section, _)| *section == Section::Body)
            .map(|(_, row)| *row)
            .collect();
        let data_rows: Vec<ElementRef<'_>> = match header_index {
            None if !body.is_empty() => body,
            None => rows.iter().skip(1).map(|(_, row)| *row).collect(),
            Some(index) => rows
                .iter()
                .skip(index + 1)
                .filter(|(section, _)| *section != Section::Head)
                .map(|(_, row)| *row)
                .collect(),
        };

        let parsed = ParsedTable::from_cells(headers, data_rows.into_iter().map(cell_texts));
        debug!(
            columns = parsed.headers.len(),
            rows = parsed.rows.len(),
            "parsed markup table"
        );
        Extraction::Parsed(parsed)
    }
}

fn child_elements(parent: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    parent.children().filter_map(ElementRef::wrap)
}

/// Rows directly owned by `table`, in document order. Nested tables are not entered.
fn table_rows(table: ElementRef<'_>) -> Vec<(Section, ElementRef<'_>)> {
    let mut rows = Vec::new();
    for child in child_elements(table) {
        let section = match child.value().name() {
            "thead" => Section::Head,
            "tbody" => Section::Body,
            "tfoot" => Section::Foot,
            "tr" => {
                rows.push((Section::Body, child));
                continue;
            }
            _ => continue,
        };
        rows.extend(
            child_elements(child)
                .filter(|row| row.value().name() == "tr")
                .map(|row| (section, row)),
        );
    }
    rows
}

/// Trimmed text of each `<td>`/`<th>` in the row. Blank cells stay as `""`.
fn cell_texts(row: ElementRef<'_>) -> Vec<String> {
    child_elements(row)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}
