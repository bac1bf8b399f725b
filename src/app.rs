use std::time::Duration;

use eframe::egui;

use crate::config::ExplorerConfig;
use crate::remote::HttpFetcher;
use crate::state::{AppState, RemoteAssets, Tab};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MeteoriteExplorerApp {
    pub state: AppState,
    pub assets: RemoteAssets,
}

impl MeteoriteExplorerApp {
    /// Start the remote fetches and load the configured data file.
    pub fn new(config: ExplorerConfig) -> Self {
        let assets = RemoteAssets::start(HttpFetcher, &config);
        let data_path = config.data_path.clone();
        let mut state = AppState::new(config);
        state.load(&data_path);
        Self { state, assets }
    }
}

impl eframe::App for MeteoriteExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Remote assets ----
        if self.assets.poll(self.state.config.fetch_timeout()) {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, &self.assets);
            });

        // ---- Central panel: tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::page_header(ui);
            ui.separator();
            panels::tab_bar(ui, &mut self.state);
            ui.separator();
            panels::tab_intro(ui, self.state.active_tab);
            match self.state.active_tab {
                Tab::MassVsYear => plot::mass_vs_year(ui, &self.state),
                Tab::MassVsCount => plot::mass_vs_count(ui, &self.state),
                Tab::Location => plot::location(ui, &self.state, &self.assets),
            }
        });
    }
}
