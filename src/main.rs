mod app;
mod color;
mod config;
mod data;
mod error;
mod remote;
mod state;
mod ui;

use std::path::PathBuf;

use app::MeteoriteExplorerApp;
use config::ExplorerConfig;
use eframe::egui;
use ui::panels::PAGE_TITLE;

fn main() -> eframe::Result {
    env_logger::init();

    let mut config = ExplorerConfig::discover().unwrap_or_else(|e| {
        log::warn!("Ignoring configuration, using defaults: {e:#}");
        ExplorerConfig::default()
    });
    if let Some(path) = std::env::args_os().nth(1) {
        config.data_path = PathBuf::from(path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(PAGE_TITLE)
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Meteorite Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(MeteoriteExplorerApp::new(config)))),
    )
}
