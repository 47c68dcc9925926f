pub mod json;
pub mod table;

pub use json::{to_data_uri, to_json, JSON_FILE_NAME};
pub use table::render_table;
