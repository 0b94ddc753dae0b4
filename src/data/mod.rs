//! Data module - file reading and CSV parsing

mod parser;
mod reader;
mod record;

pub use parser::{CsvParser, ParseError, RowError};
pub use reader::{FileReader, ReadError, ReadHandle, ReadPoll};
pub use record::{month_label, RowRecord};
