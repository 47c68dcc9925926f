// src/export/json.rs
use anyhow::{Context, Result};

use crate::table::Record;

/// File name used for every save or upload.
pub const JSON_FILE_NAME: &str = "table-data.json";

const DATA_URI_PREFIX: &str = "data:text/json;charset=utf-8,";

/// Serialize rows as a 2-space indented JSON array, keys in header order.
pub fn to_json(rows: &[Record]) -> Result<String> {
    serde_json::to_string_pretty(rows).context("serializing rows to JSON")
}

/// Percent-encoded `data:` URI for the client-side save picker.
pub fn to_data_uri(json: &str) -> String {
    format!("{}{}", DATA_URI_PREFIX, urlencoding::encode(json))
}
