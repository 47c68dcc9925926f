//! Turn pasted spreadsheet or web-page tables into headers, records and JSON.
//!
//! ```
//! use tablepaste::extract::{dispatch::dispatch, Outcome};
//!
//! let outcome = dispatch("Name\tAge\nAlice\t30", None);
//! let Outcome::Parsed(table) = outcome else { panic!("not parsed") };
//! assert_eq!(table.headers, vec!["Name", "Age"]);
//! assert_eq!(table.rows[0]["Age"], "30");
//! ```

pub mod config;
pub mod export;
pub mod extract;
pub mod input;
pub mod preview;
pub mod table;
pub mod upload;

pub use extract::{ClipboardPayload, Dispatcher, Outcome, ParseFailure};
pub use preview::{PreviewState, ViewMode};
pub use table::{ParsedTable, Record};
