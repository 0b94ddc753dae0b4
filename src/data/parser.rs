//! CSV Parser Module
//! Turns uploaded CSV text into Row Records.
//!
//! Expected input (comma-delimited, header first, columns in any order):
//! ```csv
//! month,savings,predictedSavings
//! 1,100,120
//! 2,150,140
//! ```
//!
//! Malformed data lines are skipped and reported with their line number; the
//! remaining rows are kept in file order.

use crate::data::RowRecord;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fmt;
use thiserror::Error;

const MONTH_COL: &str = "month";
const SAVINGS_COL: &str = "savings";
const PREDICTED_COLS: [&str; 2] = ["predictedSavings", "predicted_savings"];

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV header is missing the '{0}' column")]
    MissingColumn(String),
}

/// A data line that did not become a Row Record.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: u64,
    pub reason: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.reason)
    }
}

/// Rows that parsed cleanly plus the lines that were skipped.
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub rows: Vec<RowRecord>,
    pub skipped: Vec<RowError>,
}

pub struct CsvParser;

impl CsvParser {
    /// Parse the whole document at once.
    pub fn parse(content: &str) -> Result<ParseOutcome, ParseError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        if content.trim().is_empty() {
            return Ok(ParseOutcome::default());
        }

        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        Self::check_headers(&headers)?;

        let mut outcome = ParseOutcome::default();
        for (index, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    let line = e.position().map(|p| p.line()).unwrap_or(index as u64 + 2);
                    outcome.skipped.push(RowError {
                        line,
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            // A whitespace-only line trims down to a single empty field
            if record.len() == 1 && record[0].is_empty() {
                continue;
            }

            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(index as u64 + 2);

            match Self::parse_record(&record, &headers) {
                Ok(row) => outcome.rows.push(row),
                Err(reason) => outcome.skipped.push(RowError { line, reason }),
            }
        }

        Ok(outcome)
    }

    fn check_headers(headers: &StringRecord) -> Result<(), ParseError> {
        let has = |name: &str| headers.iter().any(|h| h == name);

        for required in [MONTH_COL, SAVINGS_COL] {
            if !has(required) {
                return Err(ParseError::MissingColumn(required.to_string()));
            }
        }
        if !PREDICTED_COLS.iter().any(|name| has(name)) {
            return Err(ParseError::MissingColumn(PREDICTED_COLS[0].to_string()));
        }
        Ok(())
    }

    fn parse_record(record: &StringRecord, headers: &StringRecord) -> Result<RowRecord, String> {
        if record.len() != headers.len() {
            return Err(format!(
                "expected {} fields, found {}",
                headers.len(),
                record.len()
            ));
        }

        let row: RowRecord = record
            .deserialize(Some(headers))
            .map_err(|e| Self::describe_field_error(&e, headers))?;

        if !row.savings.is_finite() {
            return Err(format!("{} is not a finite number", SAVINGS_COL));
        }
        if !row.predicted_savings.is_finite() {
            return Err(format!("{} is not a finite number", PREDICTED_COLS[0]));
        }
        Ok(row)
    }

    fn describe_field_error(err: &csv::Error, headers: &StringRecord) -> String {
        if let csv::ErrorKind::Deserialize { err, .. } = err.kind() {
            let column = err
                .field()
                .and_then(|i| headers.get(i as usize))
                .unwrap_or("field");
            return format!("invalid {}: {}", column, err.kind());
        }
        err.to_string()
    }
}
