//! Stats module - savings totals, trend projection and anomaly detection

mod calculator;

pub use calculator::{
    Anomaly, Forecast, SavingsCalculator, StatsError, Summary, DEFAULT_ANOMALY_THRESHOLD,
    DEFAULT_FORECAST_MONTHS,
};
