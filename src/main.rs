//! Savings Tracker - Monthly savings CSV viewer
//!
//! Loads a CSV of monthly savings, shows totals against a goal and draws
//! actual and predicted savings charts.

mod charts;
mod config;
mod data;
mod error;
mod gui;
mod stats;

use anyhow::Context;
use config::AppConfig;
use eframe::egui;
use gui::SavingsApp;
use log::info;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load().context("failed to load configuration")?;
    info!("Savings goal: {:.2}", config.savings_goal);

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([900.0, 600.0])
            .with_title("Savings Tracker"),
        ..Default::default()
    };

    // The app context is built once here and handed to eframe
    let app = SavingsApp::new(config);
    eframe::run_native(
        "Savings Tracker",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start window: {e}"))
}
