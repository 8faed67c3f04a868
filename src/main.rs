mod app;
mod color;
mod config;
mod data;
mod error;
mod state;
mod ui;

use std::path::PathBuf;

use app::TrackerApp;
use clap::Parser;
use config::TrackerConfig;
use eframe::egui;
use state::AppState;

/// Desktop dashboard for a CSV-backed migration tracker.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Tracker CSV file (overrides `data_path` from the config).
    file: Option<PathBuf>,

    /// JSON config file.
    #[arg(long, short)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => TrackerConfig::load(path)?,
        None => TrackerConfig::default(),
    };
    if let Some(file) = cli.file {
        config.data_path = file;
    }

    let mut state = AppState::new(config);
    let path = state.data_path.clone();
    if path.exists() {
        let result = state.open(&path);
        state.report("Open", result);
    } else {
        log::warn!("{} does not exist yet, use File → Open…", path.display());
        state.status_message = Some(format!("{} not found", path.display()));
    }

    let title = state.config.title.clone();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([640.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(|_cc| Ok(Box::new(TrackerApp::new(state)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
