//! Savings Tracker Main Application
//! Owns the view state and runs the upload, calculate and render pipeline.

use crate::charts::{render_charts, StaticChartRenderer, SurfaceRegistry};
use crate::config::AppConfig;
use crate::data::{CsvParser, FileReader, ReadHandle, ReadPoll, RowError, RowRecord};
use crate::error::AppError;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::{Anomaly, Forecast, SavingsCalculator, Summary};
use egui::SidePanel;
use log::{error, info, warn};
use std::path::{Path, PathBuf};

/// Everything the window shows. Only `SavingsApp` writes to it.
#[derive(Debug, Default)]
pub struct ViewState {
    pub results: Vec<RowRecord>,
    pub total_savings: f64,
    pub remaining_savings_needed: f64,
    pub summary: Summary,
    pub forecast: Option<Forecast>,
    pub anomalies: Vec<Anomaly>,
    pub skipped_rows: Vec<RowError>,
    pub error: Option<String>,
    pub source: Option<PathBuf>,
}

/// Main application window and view controller.
pub struct SavingsApp {
    config: AppConfig,
    goal: f64,
    state: ViewState,
    surfaces: SurfaceRegistry,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async file read
    pending: Option<ReadHandle>,
}

impl SavingsApp {
    pub fn new(config: AppConfig) -> Self {
        Self::with_surfaces(config, SurfaceRegistry::standard())
    }

    pub fn with_surfaces(config: AppConfig, surfaces: SurfaceRegistry) -> Self {
        let goal = config.savings_goal;
        let mut summary = SavingsCalculator::summarize(&[], goal);
        summary.monthly_savings_target =
            SavingsCalculator::monthly_target(goal, config.goal_timeframe_months);
        Self {
            config,
            goal,
            state: ViewState {
                remaining_savings_needed: summary.remaining_savings_needed,
                summary,
                ..ViewState::default()
            },
            surfaces,
            control_panel: ControlPanel::new(goal),
            chart_viewer: ChartViewer::new(),
            pending: None,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn surfaces(&self) -> &SurfaceRegistry {
        &self.surfaces
    }

    pub fn goal(&self) -> f64 {
        self.goal
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    fn fail(&mut self, err: AppError) {
        error!("{}", err);
        self.state.error = Some(err.to_string());
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.start_upload(path);
        }
    }

    /// Begin reading `path`. Supersedes any read still in flight.
    pub fn start_upload(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if let Some(previous) = self.pending.take() {
            warn!(
                "Discarding pending read of {} in favour of {}",
                previous.path().display(),
                path.display()
            );
        }
        info!("Reading {}", path.display());
        self.pending = Some(FileReader::read(path));
    }

    /// Apply a finished read, if any. Returns true once the pending read completed.
    pub fn poll_upload(&mut self) -> bool {
        let Some(handle) = self.pending.take() else {
            return false;
        };

        match handle.try_recv() {
            ReadPoll::Pending(handle) => {
                self.pending = Some(handle);
                false
            }
            ReadPoll::Ready {
                path,
                result: Ok(content),
            } => {
                if self.process_csv(&content) {
                    self.state.source = Some(path);
                }
                true
            }
            ReadPoll::Ready { result: Err(e), .. } => {
                self.fail(e.into());
                true
            }
        }
    }

    /// Parse `content` and replace the current rows. Returns false if the batch was rejected.
    pub fn process_csv(&mut self, content: &str) -> bool {
        let outcome = match CsvParser::parse(content) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.fail(e.into());
                return false;
            }
        };

        if let Err(e) = SavingsCalculator::checked_total(&outcome.rows) {
            self.fail(e.into());
            return false;
        }

        for skipped in &outcome.skipped {
            warn!("Skipped CSV {}", skipped);
        }
        info!(
            "Loaded {} rows ({} skipped)",
            outcome.rows.len(),
            outcome.skipped.len()
        );

        self.state.results = outcome.rows;
        self.state.skipped_rows = outcome.skipped;
        self.state.error = None;
        self.calculate_savings();
        true
    }

    /// Recompute totals, trend and anomalies from the current rows, then redraw.
    pub fn calculate_savings(&mut self) {
        let rows = &self.state.results;
        let mut summary = SavingsCalculator::summarize(rows, self.goal);
        summary.monthly_savings_target =
            SavingsCalculator::monthly_target(self.goal, self.config.goal_timeframe_months);

        self.state.total_savings = summary.total_savings;
        self.state.remaining_savings_needed = summary.remaining_savings_needed;
        self.state.summary = summary;
        self.state.forecast = SavingsCalculator::forecast(rows, self.config.forecast_months);
        self.state.anomalies = SavingsCalculator::anomalies(rows, self.config.anomaly_threshold);
        for anomaly in &self.state.anomalies {
            info!(
                "Month {} savings of {:.2} is unusual (z = {:.2})",
                anomaly.month, anomaly.savings, anomaly.z_score
            );
        }
        self.render_charts();
    }

    pub fn set_goal(&mut self, goal: f64) {
        if !goal.is_finite() || goal < 0.0 {
            self.fail(AppError::InvalidGoal(goal));
            return;
        }
        self.goal = goal;
        self.calculate_savings();
    }

    /// Redraw both surfaces. A successful redraw clears any earlier error.
    pub fn render_charts(&mut self) {
        match render_charts(
            &mut self.surfaces,
            &self.state.results,
            self.state.forecast.as_ref(),
            &self.config.month_label_prefix,
        ) {
            Ok(()) => self.state.error = None,
            Err(e) => self.fail(e.into()),
        }
    }

    /// Write both charts as PNG files into `dir`.
    pub fn export_charts(&mut self, dir: &Path) -> Option<Vec<PathBuf>> {
        match StaticChartRenderer::export_surfaces(&self.surfaces, dir, self.config.export_size())
        {
            Ok(paths) => {
                self.state.error = None;
                Some(paths)
            }
            Err(e) => {
                self.fail(e.into());
                None
            }
        }
    }

    fn handle_export_charts(&mut self) {
        let Some(dir) = rfd::FileDialog::new().pick_folder() else {
            return; // User cancelled
        };

        if let Some(paths) = self.export_charts(&dir) {
            self.control_panel
                .set_status(&format!("Exported {} charts", paths.len()));
            if let Err(e) = open::that(&dir) {
                warn!("Could not open {}: {}", dir.display(), e);
            }
        }
    }
}

impl eframe::App for SavingsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.poll_upload() {
            let status = match &self.state.error {
                Some(_) => "Upload failed".to_string(),
                None => format!("Loaded {} rows", self.state.results.len()),
            };
            self.control_panel.set_status(&status);
        }

        // Keep polling while the read is in flight
        if self.is_loading() {
            ctx.request_repaint();
        }

        let loading = self.is_loading();
        let has_charts = self.surfaces.has_charts();

        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self
                        .control_panel
                        .show(ui, &self.state, loading, has_charts);

                    match action {
                        ControlPanelAction::BrowseCsv => {
                            self.handle_browse_csv();
                            if self.is_loading() {
                                self.control_panel.set_status("Reading CSV file...");
                            }
                        }
                        ControlPanelAction::GoalChanged(goal) => self.set_goal(goal),
                        ControlPanelAction::ExportCharts => self.handle_export_charts(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer
                .show(ui, &self.surfaces, !self.state.results.is_empty());
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::{PREDICTED_SAVINGS_CHART, SAVINGS_CHART};
    use std::io::Write;
    use std::time::Duration;

    const EXAMPLE: &str = "month,savings,predictedSavings\n1,100,120\n2,150,140\n";

    fn app() -> SavingsApp {
        SavingsApp::new(AppConfig::default())
    }

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn wait_for_upload(app: &mut SavingsApp) {
        for _ in 0..1000 {
            if app.poll_upload() {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("upload did not complete");
    }

    #[test]
    fn starts_awaiting_upload() {
        let app = app();
        assert!(app.state().results.is_empty());
        assert_eq!(app.state().total_savings, 0.0);
        assert_eq!(app.state().remaining_savings_needed, 1000.0);
        assert!(!app.surfaces().has_charts());
        assert!(!app.is_loading());
    }

    #[test]
    fn process_csv_updates_totals_and_charts() {
        let mut app = app();
        assert!(app.process_csv(EXAMPLE));

        let state = app.state();
        assert_eq!(state.results.len(), 2);
        assert_eq!(state.total_savings, 250.0);
        assert_eq!(state.remaining_savings_needed, 750.0);
        assert!(state.forecast.is_some());
        assert!(state.error.is_none());

        let bar = app.surfaces().get(SAVINGS_CHART).unwrap().unwrap();
        assert_eq!(bar.config.datasets[0].data, vec![100.0, 150.0]);
        let line = app.surfaces().get(PREDICTED_SAVINGS_CHART).unwrap().unwrap();
        assert_eq!(line.config.datasets[0].data, vec![120.0, 140.0]);
    }

    #[test]
    fn upload_reads_file_asynchronously() {
        let file = csv_file(EXAMPLE);
        let mut app = app();

        app.start_upload(file.path());
        assert!(app.is_loading());
        wait_for_upload(&mut app);

        assert!(!app.is_loading());
        assert_eq!(app.state().total_savings, 250.0);
        assert_eq!(app.state().source.as_deref(), Some(file.path()));
    }

    #[test]
    fn reupload_replaces_previous_rows() {
        let mut app = app();
        app.process_csv(EXAMPLE);

        app.process_csv("month,savings,predictedSavings\n7,10,11\n");

        let state = app.state();
        assert_eq!(state.results, vec![RowRecord::new(7, 10.0, 11.0)]);
        assert_eq!(state.total_savings, 10.0);
        let bar = app.surfaces().get(SAVINGS_CHART).unwrap().unwrap();
        assert_eq!(bar.config.labels, vec!["Month 7"]);
        assert_eq!(bar.config.datasets[0].data, vec![10.0]);
    }

    #[test]
    fn read_failure_leaves_state_untouched() {
        let mut app = app();
        app.process_csv(EXAMPLE);
        let generation = app.surfaces().get(SAVINGS_CHART).unwrap().unwrap().generation;

        let dir = tempfile::tempdir().unwrap();
        app.start_upload(dir.path().join("missing.csv"));
        wait_for_upload(&mut app);

        let state = app.state();
        assert!(state.error.as_deref().unwrap().contains("missing.csv"));
        assert_eq!(state.results.len(), 2);
        assert_eq!(state.total_savings, 250.0);
        let bar = app.surfaces().get(SAVINGS_CHART).unwrap().unwrap();
        assert_eq!(bar.generation, generation);
    }

    #[test]
    fn rejected_batch_leaves_state_untouched() {
        let mut app = app();
        app.process_csv(EXAMPLE);

        assert!(!app.process_csv("date,amount\n2024-01,5\n"));

        let state = app.state();
        assert!(state.error.as_deref().unwrap().contains("month"));
        assert_eq!(state.total_savings, 250.0);
    }

    #[test]
    fn malformed_rows_do_not_corrupt_totals() {
        let mut app = app();
        app.process_csv("month,savings,predictedSavings\n1,100,120\n2,oops,140\n3,50,60\n");

        let state = app.state();
        assert_eq!(state.results.len(), 2);
        assert_eq!(state.total_savings, 150.0);
        assert_eq!(state.skipped_rows.len(), 1);
        assert_eq!(state.skipped_rows[0].line, 3);
        assert!(state.error.is_none());
    }

    #[test]
    fn newer_upload_supersedes_pending_one() {
        let first = csv_file("month,savings,predictedSavings\n1,999,999\n");
        let second = csv_file(EXAMPLE);
        let mut app = app();

        app.start_upload(first.path());
        app.start_upload(second.path());
        wait_for_upload(&mut app);

        assert_eq!(app.state().total_savings, 250.0);
        assert_eq!(app.state().source.as_deref(), Some(second.path()));
        assert!(!app.poll_upload());
    }

    #[test]
    fn goal_changes_recalculate() {
        let mut app = app();
        app.process_csv(EXAMPLE);

        app.set_goal(250.0);
        assert_eq!(app.state().remaining_savings_needed, 0.0);
        app.set_goal(200.0);
        assert_eq!(app.state().remaining_savings_needed, 0.0);
        assert_eq!(app.state().summary.surplus(), 50.0);
        app.set_goal(300.0);
        assert_eq!(app.state().remaining_savings_needed, 50.0);

        app.set_goal(-5.0);
        assert_eq!(app.goal(), 300.0);
        assert!(app.state().error.is_some());
    }

    #[test]
    fn missing_surface_becomes_error_message() {
        let surfaces = SurfaceRegistry::with_surfaces(&[SAVINGS_CHART]);
        let mut app = SavingsApp::with_surfaces(AppConfig::default(), surfaces);

        app.process_csv(EXAMPLE);

        let message = app.state().error.clone().unwrap();
        assert!(message.contains(PREDICTED_SAVINGS_CHART));
        assert_eq!(app.state().total_savings, 250.0);
    }

    #[test]
    fn export_without_charts_reports_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();

        assert!(app.export_charts(dir.path()).is_none());
        assert!(app.state().error.as_deref().unwrap().contains("No charts"));
    }

    #[test]
    fn goal_change_clears_stale_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        assert!(app.export_charts(dir.path()).is_none());
        assert!(app.state().error.is_some());

        app.set_goal(500.0);
        assert!(app.state().error.is_none());
        assert_eq!(app.state().remaining_savings_needed, 500.0);
    }

    #[test]
    fn export_clears_stale_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        app.process_csv(EXAMPLE);

        app.start_upload(dir.path().join("gone.csv"));
        wait_for_upload(&mut app);
        assert!(app.state().error.as_deref().unwrap().contains("gone.csv"));

        let paths = app.export_charts(&dir.path().join("out")).unwrap();
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.exists()));
        assert!(app.state().error.is_none());
    }

    #[test]
    fn overflowing_total_rejects_batch() {
        let mut app = app();
        app.process_csv(EXAMPLE);

        assert!(!app.process_csv("month,savings,predictedSavings\n1,1.7e308,0\n2,1.7e308,0\n"));

        let state = app.state();
        assert!(state.error.as_deref().unwrap().contains("out of range"));
        assert_eq!(state.results.len(), 2);
        assert_eq!(state.total_savings, 250.0);
        assert!(!state.summary.goal_reached());
    }

    #[test]
    fn flags_anomalies_and_monthly_target() {
        let config = AppConfig {
            goal_timeframe_months: Some(10),
            ..AppConfig::default()
        };
        let mut app = SavingsApp::new(config);
        assert_eq!(app.state().summary.monthly_savings_target, Some(100.0));

        let mut content = String::from("month,savings,predictedSavings\n");
        for month in 1..=9 {
            content.push_str(&format!("{},100,100\n", month));
        }
        content.push_str("10,1000,100\n");
        app.process_csv(&content);

        let anomalies = &app.state().anomalies;
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].month, 10);

        app.set_goal(2000.0);
        assert_eq!(app.state().summary.monthly_savings_target, Some(200.0));
    }

    #[test]
    fn trend_projection_is_drawn_on_predicted_chart() {
        let mut app = app();
        app.process_csv(EXAMPLE);

        let line = app.surfaces().get(PREDICTED_SAVINGS_CHART).unwrap().unwrap();
        assert_eq!(line.config.datasets.len(), 2);
        assert_eq!(line.config.labels.len(), 2 + AppConfig::default().forecast_months);
        assert_eq!(line.config.labels.last().unwrap(), "Month 6");
    }
}
