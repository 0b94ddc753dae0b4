//! Chart Viewer Widget
//! Central scrollable panel showing both drawing surfaces.

use crate::charts::{ChartPlotter, SurfaceRegistry, STANDARD_SURFACES};
use egui::{Color32, RichText, ScrollArea};

const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 320.0;

#[derive(Default)]
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the mounted charts, or a placeholder until data is loaded.
    pub fn show(&self, ui: &mut egui::Ui, surfaces: &SurfaceRegistry, has_rows: bool) {
        if !has_rows || !surfaces.has_charts() {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        }

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                for id in STANDARD_SURFACES {
                    egui::Frame::none()
                        .rounding(8.0)
                        .stroke(egui::Stroke::new(1.0, Color32::from_gray(90)))
                        .fill(ui.visuals().widgets.noninteractive.bg_fill)
                        .inner_margin(12.0)
                        .show(ui, |ui| match surfaces.get(id) {
                            Ok(Some(chart)) => {
                                ui.label(RichText::new(chart.config.title()).size(16.0).strong());
                                ui.add_space(6.0);
                                ChartPlotter::draw_chart(ui, id, chart, CHART_HEIGHT);
                            }
                            Ok(None) => {
                                ui.label(RichText::new("No chart").color(Color32::GRAY));
                            }
                            Err(e) => {
                                ui.label(
                                    RichText::new(e.to_string())
                                        .color(Color32::from_rgb(220, 53, 69)),
                                );
                            }
                        });
                    ui.add_space(CHART_SPACING);
                }
            });
    }
}
