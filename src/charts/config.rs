//! Chart Configuration
//! Typed chart description shared by the interactive plotter and the PNG exporter.

use crate::data::{month_label, RowRecord};
use crate::stats::Forecast;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
}

/// Color with an alpha channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn alpha_u8(&self) -> u8 {
        (self.a.clamp(0.0, 1.0) * 255.0).round() as u8
    }
}

pub const ACTUAL_FILL: Rgba = Rgba::new(75, 192, 192, 0.2);
pub const ACTUAL_BORDER: Rgba = Rgba::new(75, 192, 192, 1.0);
pub const PREDICTED_BORDER: Rgba = Rgba::new(255, 99, 132, 1.0);
pub const TREND_BORDER: Rgba = Rgba::new(40, 167, 69, 1.0);

/// Dash and gap lengths of the trend projection line.
const TREND_DASH: [f32; 2] = [6.0, 4.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Rgba>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Rgba>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_dash: Option<Vec<f32>>,
}

impl Dataset {
    pub fn fills_area(&self) -> bool {
        self.fill.unwrap_or(false)
    }

    /// Dash and gap length for a dashed line, `None` when solid.
    pub fn dash(&self) -> Option<(f32, f32)> {
        match self.border_dash.as_deref()? {
            [] => None,
            [dash] => Some((*dash, *dash)),
            [dash, gap, ..] => Some((*dash, *gap)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisScale {
    pub begin_at_zero: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Scales {
    pub y: AxisScale,
}

/// Chart type, labels, datasets and axis scaling for one drawing surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub scales: Scales,
}

impl ChartConfig {
    /// Bar chart of actual savings per month.
    pub fn actual_savings(rows: &[RowRecord], label_prefix: &str) -> Self {
        Self {
            chart_type: ChartType::Bar,
            labels: Self::month_labels(rows, label_prefix),
            datasets: vec![Dataset {
                label: "Actual Savings".to_string(),
                data: rows.iter().map(|r| r.savings).collect(),
                background_color: Some(ACTUAL_FILL),
                border_color: Some(ACTUAL_BORDER),
                border_width: Some(1.0),
                fill: None,
                border_dash: None,
            }],
            scales: Scales {
                y: AxisScale {
                    begin_at_zero: true,
                },
            },
        }
    }

    /// Unfilled line chart of predicted savings per month.
    pub fn predicted_savings(rows: &[RowRecord], label_prefix: &str) -> Self {
        Self {
            chart_type: ChartType::Line,
            labels: Self::month_labels(rows, label_prefix),
            datasets: vec![Dataset {
                label: "Predicted Savings".to_string(),
                data: rows.iter().map(|r| r.predicted_savings).collect(),
                background_color: None,
                border_color: Some(PREDICTED_BORDER),
                border_width: None,
                fill: Some(false),
                border_dash: None,
            }],
            scales: Scales {
                y: AxisScale {
                    begin_at_zero: true,
                },
            },
        }
    }

    /// Add the fitted trend as a dashed series, extended over the projected months.
    pub fn with_trend(
        mut self,
        rows: &[RowRecord],
        forecast: &Forecast,
        label_prefix: &str,
    ) -> Self {
        let mut data: Vec<f64> = rows.iter().map(|r| forecast.predict(r.month)).collect();
        for &(month, value) in &forecast.projections {
            self.labels.push(month_label(label_prefix, month));
            data.push(value);
        }

        self.datasets.push(Dataset {
            label: "Trend Projection".to_string(),
            data,
            background_color: None,
            border_color: Some(TREND_BORDER),
            border_width: None,
            fill: Some(false),
            border_dash: Some(TREND_DASH.to_vec()),
        });
        self
    }

    fn month_labels(rows: &[RowRecord], label_prefix: &str) -> Vec<String> {
        rows.iter().map(|r| r.label(label_prefix)).collect()
    }

    /// Title used for exported images.
    pub fn title(&self) -> &str {
        self.datasets
            .first()
            .map(|d| d.label.as_str())
            .unwrap_or("Savings")
    }

    /// Y range covering every data point, plus zero when the axis begins at zero.
    pub fn y_range(&self) -> (f64, f64) {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in self.datasets.iter().flat_map(|d| d.data.iter()) {
            if v.is_finite() {
                min = min.min(v);
                max = max.max(v);
            }
        }

        if min.is_infinite() {
            return (0.0, 1.0);
        }
        if self.scales.y.begin_at_zero {
            min = min.min(0.0);
            max = max.max(0.0);
        }
        if max == min {
            return (min, min + 1.0);
        }

        let pad = (max - min) * 0.1;
        let low = if self.scales.y.begin_at_zero && min == 0.0 {
            0.0
        } else {
            min - pad
        };
        (low, max + pad)
    }
}

/// Label for an x position; only integral positions inside `labels` get one.
pub fn axis_label(labels: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}
