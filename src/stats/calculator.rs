//! Savings Calculator Module
//! Computes the savings summary, a linear trend projection and z-score anomalies.

use crate::data::RowRecord;
use statrs::statistics::Statistics;
use thiserror::Error;

/// Default number of months projected past the last uploaded month.
pub const DEFAULT_FORECAST_MONTHS: usize = 4;
/// Months whose |z-score| exceeds this are flagged.
pub const DEFAULT_ANOMALY_THRESHOLD: f64 = 2.0;

#[derive(Error, Debug, PartialEq)]
pub enum StatsError {
    #[error("Savings total of {rows} rows is out of range")]
    TotalOverflow { rows: usize },
}

/// Aggregate figures derived from the current rows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub goal: f64,
    pub total_savings: f64,
    /// Never negative; zero once the goal is reached.
    pub remaining_savings_needed: f64,
    pub average_monthly_savings: f64,
    pub months_to_goal: Option<u32>,
    /// Goal spread evenly over the configured timeframe.
    pub monthly_savings_target: Option<f64>,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            goal: 0.0,
            total_savings: 0.0,
            remaining_savings_needed: 0.0,
            average_monthly_savings: 0.0,
            months_to_goal: Some(0),
            monthly_savings_target: None,
        }
    }
}

impl Summary {
    pub fn goal_reached(&self) -> bool {
        self.total_savings >= self.goal
    }

    /// Amount saved beyond the goal.
    pub fn surplus(&self) -> f64 {
        (self.total_savings - self.goal).max(0.0)
    }
}

/// Least-squares trend of actual savings over month number.
#[derive(Debug, Clone, PartialEq)]
pub struct Forecast {
    pub slope: f64,
    pub intercept: f64,
    pub projections: Vec<(u32, f64)>,
}

impl Forecast {
    pub fn predict(&self, month: u32) -> f64 {
        self.slope * month as f64 + self.intercept
    }
}

/// A month flagged by the z-score check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anomaly {
    pub month: u32,
    pub savings: f64,
    pub z_score: f64,
}

pub struct SavingsCalculator;

impl SavingsCalculator {
    /// Compute totals against an explicit savings goal.
    pub fn summarize(rows: &[RowRecord], goal: f64) -> Summary {
        if rows.is_empty() {
            return Summary {
                goal,
                remaining_savings_needed: goal.max(0.0),
                months_to_goal: if goal <= 0.0 { Some(0) } else { None },
                ..Summary::default()
            };
        }

        let total_savings: f64 = rows.iter().map(|r| r.savings).sum();
        let remaining_savings_needed = (goal - total_savings).max(0.0);
        let average_monthly_savings = rows.iter().map(|r| r.savings).mean();

        let months_to_goal = if remaining_savings_needed == 0.0 {
            Some(0)
        } else if average_monthly_savings > 0.0 {
            Some((remaining_savings_needed / average_monthly_savings).ceil() as u32)
        } else {
            None
        };

        Summary {
            goal,
            total_savings,
            remaining_savings_needed,
            average_monthly_savings,
            months_to_goal,
            monthly_savings_target: None,
        }
    }

    /// Sum of savings, rejected when it leaves the finite range.
    pub fn checked_total(rows: &[RowRecord]) -> Result<f64, StatsError> {
        let total: f64 = rows.iter().map(|r| r.savings).sum();
        if total.is_finite() {
            Ok(total)
        } else {
            Err(StatsError::TotalOverflow { rows: rows.len() })
        }
    }

    /// Amount to put aside each month to reach `goal` within `timeframe_months`.
    pub fn monthly_target(goal: f64, timeframe_months: Option<u32>) -> Option<f64> {
        match timeframe_months {
            Some(months) if months > 0 => Some(goal / months as f64),
            _ => None,
        }
    }

    /// Months whose savings lie more than `threshold` population standard deviations from the mean.
    pub fn anomalies(rows: &[RowRecord], threshold: f64) -> Vec<Anomaly> {
        if rows.len() < 2 {
            return Vec::new();
        }

        let mean = rows.iter().map(|r| r.savings).mean();
        let std_dev = rows.iter().map(|r| r.savings).population_std_dev();
        if !std_dev.is_finite() || std_dev == 0.0 {
            return Vec::new();
        }

        rows.iter()
            .filter_map(|r| {
                let z_score = (r.savings - mean) / std_dev;
                (z_score.abs() > threshold).then_some(Anomaly {
                    month: r.month,
                    savings: r.savings,
                    z_score,
                })
            })
            .collect()
    }

    /// Fit `savings = slope * month + intercept` and project the months after the last one.
    pub fn forecast(rows: &[RowRecord], months_ahead: usize) -> Option<Forecast> {
        if rows.len() < 2 || months_ahead == 0 {
            return None;
        }

        let months: Vec<f64> = rows.iter().map(|r| r.month as f64).collect();
        let savings: Vec<f64> = rows.iter().map(|r| r.savings).collect();

        let month_variance = months.iter().variance();
        if !month_variance.is_finite() || month_variance == 0.0 {
            return None;
        }

        let slope = months.iter().covariance(savings.iter()) / month_variance;
        let intercept = savings.iter().mean() - slope * months.iter().mean();
        if !slope.is_finite() || !intercept.is_finite() {
            return None;
        }

        let last_month = rows.iter().map(|r| r.month).max()?;
        let mut forecast = Forecast {
            slope,
            intercept,
            projections: Vec::with_capacity(months_ahead),
        };
        for offset in 1..=months_ahead as u32 {
            let month = last_month.saturating_add(offset);
            forecast.projections.push((month, forecast.predict(month)));
        }
        Some(forecast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn rows(values: &[(u32, f64)]) -> Vec<RowRecord> {
        values
            .iter()
            .map(|&(m, s)| RowRecord::new(m, s, s))
            .collect()
    }

    #[test]
    fn total_is_exact_sum() {
        let summary = SavingsCalculator::summarize(&rows(&[(1, 100.0), (2, 150.0)]), 1000.0);
        assert_eq!(summary.total_savings, 250.0);
        assert_eq!(summary.remaining_savings_needed, 750.0);
        assert_eq!(summary.average_monthly_savings, 125.0);
        assert_eq!(summary.months_to_goal, Some(6));
    }

    #[test]
    fn empty_rows_give_zero_total() {
        let summary = SavingsCalculator::summarize(&[], 500.0);
        assert_eq!(summary.total_savings, 0.0);
        assert_eq!(summary.remaining_savings_needed, 500.0);
        assert_eq!(summary.average_monthly_savings, 0.0);
        assert_eq!(summary.months_to_goal, None);
        assert!(!summary.goal_reached());
    }

    #[test]
    fn remaining_below_goal() {
        let summary = SavingsCalculator::summarize(&rows(&[(1, 300.0)]), 400.0);
        assert_eq!(summary.remaining_savings_needed, 100.0);
        assert!(!summary.goal_reached());
        assert_eq!(summary.surplus(), 0.0);
    }

    #[test]
    fn remaining_at_goal_is_zero() {
        let summary = SavingsCalculator::summarize(&rows(&[(1, 200.0), (2, 200.0)]), 400.0);
        assert_eq!(summary.remaining_savings_needed, 0.0);
        assert!(summary.goal_reached());
        assert_eq!(summary.months_to_goal, Some(0));
    }

    #[test]
    fn remaining_above_goal_is_floored() {
        let summary = SavingsCalculator::summarize(&rows(&[(1, 700.0)]), 400.0);
        assert_eq!(summary.remaining_savings_needed, 0.0);
        assert_eq!(summary.surplus(), 300.0);
    }

    #[test]
    fn negative_average_has_no_eta() {
        let summary = SavingsCalculator::summarize(&rows(&[(1, -50.0), (2, 10.0)]), 400.0);
        assert_eq!(summary.total_savings, -40.0);
        assert_eq!(summary.remaining_savings_needed, 440.0);
        assert_eq!(summary.months_to_goal, None);
    }

    #[test]
    fn forecast_follows_linear_trend() {
        let forecast =
            SavingsCalculator::forecast(&rows(&[(1, 100.0), (2, 150.0), (3, 200.0)]), 4).unwrap();

        assert!((forecast.slope - 50.0).abs() < EPS);
        assert!((forecast.intercept - 50.0).abs() < EPS);
        let months: Vec<u32> = forecast.projections.iter().map(|p| p.0).collect();
        assert_eq!(months, vec![4, 5, 6, 7]);
        assert!((forecast.projections[0].1 - 250.0).abs() < EPS);
        assert!((forecast.predict(7) - 400.0).abs() < EPS);
    }

    #[test]
    fn forecast_projects_after_latest_month() {
        let forecast =
            SavingsCalculator::forecast(&rows(&[(5, 10.0), (2, 10.0), (3, 10.0)]), 2).unwrap();
        assert_eq!(forecast.projections[0].0, 6);
        assert!(forecast.slope.abs() < EPS);
        assert!((forecast.projections[1].1 - 10.0).abs() < EPS);
    }

    #[test]
    fn forecast_needs_two_distinct_months() {
        assert!(SavingsCalculator::forecast(&rows(&[(1, 100.0)]), 4).is_none());
        assert!(SavingsCalculator::forecast(&rows(&[(1, 100.0), (1, 120.0)]), 4).is_none());
        assert!(SavingsCalculator::forecast(&rows(&[(1, 100.0), (2, 120.0)]), 0).is_none());
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let huge = rows(&[(1, 1.7e308), (2, 1.7e308)]);
        assert_eq!(
            SavingsCalculator::checked_total(&huge),
            Err(StatsError::TotalOverflow { rows: 2 })
        );
        assert_eq!(
            SavingsCalculator::checked_total(&rows(&[(1, 10.0), (2, 5.5)])),
            Ok(15.5)
        );
    }

    #[test]
    fn monthly_target_spreads_goal() {
        assert_eq!(SavingsCalculator::monthly_target(1200.0, Some(12)), Some(100.0));
        assert_eq!(SavingsCalculator::monthly_target(1200.0, Some(0)), None);
        assert_eq!(SavingsCalculator::monthly_target(1200.0, None), None);
    }

    #[test]
    fn flags_outlying_month() {
        let mut values: Vec<(u32, f64)> = (1..=9).map(|m| (m, 100.0)).collect();
        values.push((10, 1000.0));

        let flagged = SavingsCalculator::anomalies(&rows(&values), DEFAULT_ANOMALY_THRESHOLD);

        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].month, 10);
        assert_eq!(flagged[0].savings, 1000.0);
        assert!((flagged[0].z_score - 3.0).abs() < EPS);
    }

    #[test]
    fn no_anomalies_without_spread() {
        let flat = rows(&[(1, 50.0), (2, 50.0), (3, 50.0)]);
        assert!(SavingsCalculator::anomalies(&flat, DEFAULT_ANOMALY_THRESHOLD).is_empty());
        assert!(SavingsCalculator::anomalies(&rows(&[(1, 5.0)]), 0.5).is_empty());

        let spread = rows(&[(1, 10.0), (2, 20.0), (3, 30.0)]);
        assert!(SavingsCalculator::anomalies(&spread, DEFAULT_ANOMALY_THRESHOLD).is_empty());
        assert_eq!(SavingsCalculator::anomalies(&spread, 1.0).len(), 2);
    }
}
