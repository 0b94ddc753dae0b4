//! Static Chart Renderer
//! Exports mounted charts as PNG images using plotters.
//!
//! Each surface is written to `<surfaceId>.png` in the chosen folder:
//! - bar charts: one translucent bar per month with a solid border
//! - line charts: one series per dataset with point markers, dashed with
//!   cross markers for the trend projection

use crate::charts::{axis_label, ChartConfig, ChartType, Rgba, SurfaceRegistry};
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

const BAR_HALF_WIDTH: f64 = 0.3;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("No charts to export")]
    NothingToRender,
    #[error("Chart '{0}' has no data")]
    EmptyChart(String),
    #[error("Failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Drawing failed: {0}")]
    Draw(String),
}

fn draw_err<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Draw(err.to_string())
}

fn to_rgba(color: Rgba) -> RGBAColor {
    RGBAColor(color.r, color.g, color.b, color.a.clamp(0.0, 1.0) as f64)
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Write every mounted surface to `<surfaceId>.png` inside `dir`.
    pub fn export_surfaces(
        surfaces: &SurfaceRegistry,
        dir: &Path,
        size: (u32, u32),
    ) -> Result<Vec<PathBuf>, RenderError> {
        if !surfaces.has_charts() {
            return Err(RenderError::NothingToRender);
        }

        std::fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::new();
        for (id, chart) in surfaces.mounted() {
            let path = dir.join(format!("{}.png", id));
            Self::render_png(&chart.config, &path, size)?;
            info!("Exported {} to {}", id, path.display());
            written.push(path);
        }
        Ok(written)
    }

    /// Render a single chart to a PNG file.
    pub fn render_png(
        config: &ChartConfig,
        path: &Path,
        size: (u32, u32),
    ) -> Result<(), RenderError> {
        if config.labels.is_empty() {
            return Err(RenderError::EmptyChart(config.title().to_string()));
        }

        let root = BitMapBackend::new(path, size).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;
        Self::draw(&root, config)?;
        root.present().map_err(draw_err)?;
        Ok(())
    }

    fn draw<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        config: &ChartConfig,
    ) -> Result<(), RenderError>
    where
        DB::ErrorType: 'static,
    {
        let n = config.labels.len();
        let (y_min, y_max) = config.y_range();

        let mut chart = ChartBuilder::on(root)
            .caption(config.title(), ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), y_min..y_max)
            .map_err(draw_err)?;

        let labels = &config.labels;
        let label_fmt = |x: &f64| axis_label(labels, *x);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&label_fmt)
            .x_desc("Month")
            .y_desc("Savings")
            .draw()
            .map_err(draw_err)?;

        for dataset in &config.datasets {
            let stroke = to_rgba(dataset.border_color.unwrap_or(Rgba::new(0, 0, 0, 1.0)));
            let stroke_width = dataset.border_width.unwrap_or(2.0).round().max(1.0) as u32;

            match config.chart_type {
                ChartType::Bar => {
                    let fill =
                        to_rgba(dataset.background_color.unwrap_or(Rgba::new(0, 0, 0, 0.2)));
                    let border = ShapeStyle {
                        color: stroke,
                        filled: false,
                        stroke_width,
                    };

                    chart
                        .draw_series(dataset.data.iter().enumerate().map(|(i, &v)| {
                            let x = i as f64;
                            Rectangle::new(
                                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, v)],
                                fill.filled(),
                            )
                        }))
                        .map_err(draw_err)?
                        .label(dataset.label.as_str())
                        .legend(move |(x, y)| {
                            Rectangle::new([(x, y - 5), (x + 10, y + 5)], fill.filled())
                        });

                    chart
                        .draw_series(dataset.data.iter().enumerate().map(|(i, &v)| {
                            let x = i as f64;
                            Rectangle::new(
                                [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, v)],
                                border,
                            )
                        }))
                        .map_err(draw_err)?;
                }
                ChartType::Line => {
                    let points: Vec<(f64, f64)> = dataset
                        .data
                        .iter()
                        .enumerate()
                        .map(|(i, &v)| (i as f64, v))
                        .collect();

                    if dataset.fills_area() {
                        chart
                            .draw_series(AreaSeries::new(
                                points.iter().copied(),
                                0.0,
                                stroke.mix(0.2).filled(),
                            ))
                            .map_err(draw_err)?;
                    }

                    let line_style = stroke.stroke_width(stroke_width);
                    let series = match dataset.dash() {
                        Some((dash, gap)) => chart.draw_series(DashedLineSeries::new(
                            points.iter().copied(),
                            dash.round().max(1.0) as u32,
                            gap.round().max(1.0) as u32,
                            line_style,
                        )),
                        None => {
                            chart.draw_series(LineSeries::new(points.iter().copied(), line_style))
                        }
                    };
                    series
                        .map_err(draw_err)?
                        .label(dataset.label.as_str())
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + 15, y)], stroke.stroke_width(2))
                        });

                    if dataset.dash().is_some() {
                        let marker = stroke.stroke_width(2);
                        chart
                            .draw_series(points.iter().map(|&(x, y)| Cross::new((x, y), 4, marker)))
                            .map_err(draw_err)?;
                    } else {
                        chart
                            .draw_series(
                                points
                                    .iter()
                                    .map(|&(x, y)| Circle::new((x, y), 3, stroke.filled())),
                            )
                            .map_err(draw_err)?;
                    }
                }
            }
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(draw_err)?;

        Ok(())
    }
}
