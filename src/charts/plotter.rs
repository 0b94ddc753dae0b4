//! Chart Plotter Module
//! Draws mounted charts interactively using egui_plot.

use crate::charts::{axis_label, ChartType, Dataset, MountedChart, Rgba};
use egui::Color32;
use egui_plot::{
    Bar, BarChart, GridMark, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoints, Points,
};

/// Fallback when a dataset has no border color
pub const DEFAULT_COLOR: Color32 = Color32::from_rgb(52, 152, 219);

const BAR_WIDTH: f64 = 0.6;

pub struct ChartPlotter;

impl ChartPlotter {
    pub fn to_color32(color: Rgba) -> Color32 {
        Color32::from_rgba_unmultiplied(color.r, color.g, color.b, color.alpha_u8())
    }

    fn stroke_color(dataset: &Dataset) -> Color32 {
        dataset
            .border_color
            .map(Self::to_color32)
            .unwrap_or(DEFAULT_COLOR)
    }

    /// Draw one surface's chart.
    /// X-axis: month labels, Y-axis: savings
    pub fn draw_chart(ui: &mut egui::Ui, surface_id: &str, chart: &MountedChart, height: f32) {
        let config = &chart.config;
        let labels = config.labels.clone();
        let label_count = labels.len();

        // A fresh id per generation drops the old plot's zoom and pan state
        let mut plot = Plot::new((surface_id, chart.generation))
            .height(height)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_label("Month")
            .y_axis_label("Savings")
            .include_x(-0.5)
            .include_x(label_count as f64 - 0.5)
            .x_grid_spacer(move |_input| {
                (0..label_count)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| axis_label(&labels, mark.value));

        if config.scales.y.begin_at_zero {
            plot = plot.include_y(0.0);
        }

        plot.show(ui, |plot_ui| {
            for dataset in &config.datasets {
                match config.chart_type {
                    ChartType::Bar => plot_ui.bar_chart(Self::bar_chart(dataset)),
                    ChartType::Line => {
                        let points: Vec<[f64; 2]> = dataset
                            .data
                            .iter()
                            .enumerate()
                            .map(|(i, &v)| [i as f64, v])
                            .collect();
                        let color = Self::stroke_color(dataset);

                        // Dashed series get cross markers
                        let shape = match dataset.dash() {
                            Some(_) => MarkerShape::Cross,
                            None => MarkerShape::Circle,
                        };

                        plot_ui.line(Self::line(dataset, &points));
                        plot_ui.points(
                            Points::new(PlotPoints::from_iter(points.iter().copied()))
                                .shape(shape)
                                .radius(3.0)
                                .color(color),
                        );
                    }
                }
            }
        });
    }

    fn bar_chart(dataset: &Dataset) -> BarChart {
        let fill = dataset
            .background_color
            .map(Self::to_color32)
            .unwrap_or_else(|| DEFAULT_COLOR.gamma_multiply(0.3));
        let stroke = egui::Stroke::new(
            dataset.border_width.unwrap_or(1.0),
            Self::stroke_color(dataset),
        );

        let bars: Vec<Bar> = dataset
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                Bar::new(i as f64, v)
                    .width(BAR_WIDTH)
                    .fill(fill)
                    .stroke(stroke)
            })
            .collect();

        BarChart::new(bars)
            .color(Self::stroke_color(dataset))
            .name(&dataset.label)
    }

    fn line(dataset: &Dataset, points: &[[f64; 2]]) -> Line {
        let mut line = Line::new(PlotPoints::from_iter(points.iter().copied()))
            .color(Self::stroke_color(dataset))
            .width(dataset.border_width.unwrap_or(2.0))
            .name(&dataset.label);
        if dataset.fills_area() {
            line = line.fill(0.0);
        }
        if let Some((length, _gap)) = dataset.dash() {
            line = line.style(LineStyle::Dashed { length });
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_alpha_to_byte() {
        let color = ChartPlotter::to_color32(Rgba::new(75, 192, 192, 1.0));
        assert_eq!(color, Color32::from_rgb(75, 192, 192));

        let translucent = ChartPlotter::to_color32(Rgba::new(0, 0, 0, 0.0));
        assert_eq!(translucent.a(), 0);
    }
}
