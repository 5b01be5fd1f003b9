pub mod dialect;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod table;

pub use dialect::Dialect;
pub use error::{CsvError, CsvResult};
pub use parser::{parse, parse_report, parse_with, ParseReport, Parsed};
pub use serializer::{serialize, serialize_with};
pub use table::{Row, RowView, Table};
