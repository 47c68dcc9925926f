pub mod types;

pub use types::{build_record, HeaderList, ParsedTable, Record};
