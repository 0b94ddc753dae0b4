//! Control Panel Widget
//! Left side panel with file selection, savings goal and the summary figures.

use crate::gui::ViewState;
use egui::{Color32, RichText, ScrollArea};

const ERROR_COLOR: Color32 = Color32::from_rgb(220, 53, 69);
const OK_COLOR: Color32 = Color32::from_rgb(40, 167, 69);
const WARN_COLOR: Color32 = Color32::from_rgb(255, 193, 7);

/// Left side control panel.
pub struct ControlPanel {
    pub goal: f64,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl ControlPanel {
    pub fn new(goal: f64) -> Self {
        Self {
            goal,
            status: "Ready".to_string(),
        }
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        state: &ViewState,
        loading: bool,
        has_charts: bool,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("💰 Savings Tracker")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== CSV File Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = state
                        .source
                        .as_ref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file selected".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(
                        if state.source.is_some() {
                            Color32::WHITE
                        } else {
                            Color32::GRAY
                        },
                    ));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                        if loading {
                            ui.spinner();
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Goal Section =====
        ui.label(RichText::new("🎯 Savings Goal").size(14.0).strong());
        ui.add_space(5.0);

        let response = ui.add(
            egui::DragValue::new(&mut self.goal)
                .speed(10.0)
                .range(0.0..=f64::MAX)
                .fixed_decimals(2),
        );
        if response.changed() {
            action = ControlPanelAction::GoalChanged(self.goal);
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Summary Section =====
        ui.label(RichText::new("📊 Summary").size(14.0).strong());
        ui.add_space(5.0);

        let summary = &state.summary;
        egui::Grid::new("summary_grid")
            .striped(true)
            .num_columns(2)
            .spacing([12.0, 4.0])
            .show(ui, |ui| {
                ui.label("Total savings:");
                ui.label(RichText::new(format!("{:.2}", state.total_savings)).strong());
                ui.end_row();

                ui.label("Remaining needed:");
                let remaining_color = if summary.goal_reached() {
                    OK_COLOR
                } else {
                    ui.visuals().text_color()
                };
                ui.label(
                    RichText::new(format!("{:.2}", state.remaining_savings_needed))
                        .strong()
                        .color(remaining_color),
                );
                ui.end_row();

                if summary.surplus() > 0.0 {
                    ui.label("Surplus:");
                    ui.label(RichText::new(format!("{:.2}", summary.surplus())).color(OK_COLOR));
                    ui.end_row();
                }

                ui.label("Monthly average:");
                ui.label(format!("{:.2}", summary.average_monthly_savings));
                ui.end_row();

                if let Some(target) = summary.monthly_savings_target {
                    ui.label("Monthly target:");
                    ui.label(format!("{:.2}", target));
                    ui.end_row();
                }

                ui.label("Months to goal:");
                ui.label(
                    summary
                        .months_to_goal
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                );
                ui.end_row();

                ui.label("Rows:");
                ui.label(state.results.len().to_string());
                ui.end_row();

                ui.label("Skipped rows:");
                ui.label(state.skipped_rows.len().to_string());
                ui.end_row();
            });

        // ===== Projection Section =====
        if let Some(forecast) = &state.forecast {
            ui.add_space(10.0);
            ui.label(RichText::new("📈 Trend Projection").size(14.0).strong());
            ui.add_space(5.0);

            egui::Grid::new("forecast_grid")
                .striped(true)
                .num_columns(2)
                .spacing([12.0, 4.0])
                .show(ui, |ui| {
                    for (month, value) in &forecast.projections {
                        ui.label(format!("Month {}", month));
                        ui.label(format!("{:.2}", value));
                        ui.end_row();
                    }
                });
            ui.label(
                RichText::new(format!("Trend: {:+.2} per month", forecast.slope))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        }

        // ===== Anomalies Section =====
        if !state.anomalies.is_empty() {
            ui.add_space(10.0);
            ui.label(RichText::new("🔍 Unusual Months").size(14.0).strong());
            ui.add_space(5.0);

            for anomaly in &state.anomalies {
                ui.label(
                    RichText::new(format!(
                        "Month {}: {:.2} (z = {:+.2})",
                        anomaly.month, anomaly.savings, anomaly.z_score
                    ))
                    .color(WARN_COLOR),
                );
            }
        }

        if !state.skipped_rows.is_empty() {
            ui.add_space(10.0);
            ui.collapsing(
                format!("⚠ {} skipped rows", state.skipped_rows.len()),
                |ui| {
                    ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                        for row in &state.skipped_rows {
                            ui.label(RichText::new(row.to_string()).size(11.0));
                        }
                    });
                },
            );
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Action Buttons =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(has_charts && !state.results.is_empty(), |ui| {
                let button = egui::Button::new(RichText::new("🖼 Export Charts").size(14.0))
                    .min_size(egui::vec2(150.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportCharts;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        match &state.error {
            Some(error) => {
                ui.label(RichText::new(format!("Error: {}", error)).size(11.0).color(ERROR_COLOR));
            }
            None => {
                ui.label(RichText::new(&self.status).size(11.0).color(Color32::GRAY));
            }
        }

        action
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    GoalChanged(f64),
    ExportCharts,
}
