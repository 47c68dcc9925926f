// src/export/table.rs
use prettytable::{format, Cell, Row, Table};

use crate::table::Record;

/// Box-drawn text rendering of the table view. Missing values render blank.
pub fn render_table(headers: &[String], rows: &[Record]) -> String {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|h| Cell::new(h).style_spec("b"))
            .collect(),
    ));

    for record in rows {
        table.add_row(Row::new(
            headers
                .iter()
                .map(|h| Cell::new(record.get(h).map(String::as_str).unwrap_or("")))
                .collect(),
        ));
    }

    table.to_string()
}
