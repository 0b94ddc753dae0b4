//! Row Record
//! One month of savings data as it appears in an uploaded CSV file.

use serde::{Deserialize, Serialize};

/// A single parsed CSV line: actual and predicted savings for one month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowRecord {
    pub month: u32,
    pub savings: f64,
    #[serde(rename = "predictedSavings", alias = "predicted_savings")]
    pub predicted_savings: f64,
}

impl RowRecord {
    #[cfg(test)]
    pub fn new(month: u32, savings: f64, predicted_savings: f64) -> Self {
        Self {
            month,
            savings,
            predicted_savings,
        }
    }

    /// Axis label for this month, e.g. "Month 3".
    pub fn label(&self, prefix: &str) -> String {
        month_label(prefix, self.month)
    }
}

/// Axis label for a month number, with or without a prefix.
pub fn month_label(prefix: &str, month: u32) -> String {
    if prefix.is_empty() {
        month.to_string()
    } else {
        format!("{} {}", prefix, month)
    }
}
