use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::color::{ColorMap, CountGradient};
use crate::config::ExplorerConfig;
use crate::data::binning::{BinBoundaries, BinPreset};
use crate::data::filter::FilterSelection;
use crate::data::loader::load_file;
use crate::data::model::{Fall, MeteoriteDataset};
use crate::data::pipeline::{ChartInputs, FilterScope, prepare};
use crate::remote::{self, AnimationSummary, AssetCache, AssetSlot, Basemap, Fetch};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    MassVsYear,
    MassVsCount,
    Location,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::MassVsYear, Tab::MassVsCount, Tab::Location];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::MassVsYear => "Mass vs Year",
            Tab::MassVsCount => "Mass vs Count",
            Tab::Location => "Location",
        }
    }

    /// Fixed heading above the tab body. The line chart uses its dynamic title instead.
    pub fn heading(&self) -> Option<&'static str> {
        match self {
            Tab::MassVsYear => None,
            Tab::MassVsCount => Some("Masses of Meteorites"),
            Tab::Location => Some("Locations of Meteorites"),
        }
    }

    /// Explanatory paragraphs shown under the heading.
    pub fn about(&self) -> &'static [&'static str] {
        match self {
            Tab::MassVsYear => &[],
            Tab::MassVsCount => &[
                "This bar graph groups the mass of every meteorite that has fallen into \
                 ranges running from a minimum to ten times that minimum, capped at one million grams.",
                "It gives a rough idea of how large the meteorites that reach the ground are, \
                 and whether their size is something to worry about.",
            ],
            Tab::Location => &[
                "Every landing placed on the world map by the longitude and latitude \
                 where it fell.",
                "The map shows where meteorites are more and less likely to fall, \
                 and which areas might need more meteorite protection.",
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Remote assets
// ---------------------------------------------------------------------------

/// Decorative and basemap fetches, shared through one asset cache.
pub struct RemoteAssets {
    pub animation: AssetSlot<AnimationSummary>,
    pub basemap: AssetSlot<Basemap>,
}

impl RemoteAssets {
    /// Kick off both fetches according to `config`.
    pub fn start<F: Fetch + 'static>(fetcher: F, config: &ExplorerConfig) -> Self {
        let cache = Arc::new(AssetCache::new(fetcher));
        RemoteAssets {
            animation: remote::load_animation(&cache, config.animation_url.as_deref()),
            basemap: remote::load_basemap(
                &cache,
                config.topology_url.as_deref(),
                &config.topology_object,
            ),
        }
    }

    /// Poll both slots. Returns `true` while any fetch is still outstanding.
    pub fn poll(&mut self, timeout: std::time::Duration) -> bool {
        if self.animation.poll(timeout) {
            if let Some(summary) = self.animation.ready() {
                log::info!("Animation ready: {}", summary.banner_text());
            }
        }
        if self.basemap.poll(timeout) {
            if let Some(basemap) = self.basemap.ready() {
                log::info!("Basemap ready: {} rings", basemap.ring_count());
            }
        }
        self.animation.is_pending() || self.basemap.is_pending()
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ExplorerConfig,

    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<MeteoriteDataset>,
    pub source_path: Option<PathBuf>,

    pub selection: FilterSelection,
    pub bin_preset: BinPreset,
    pub filter_scope: FilterScope,
    pub active_tab: Tab,

    /// Output of the last pipeline run.
    pub charts: ChartInputs,
    pub color_map: ColorMap,
    pub gradient: CountGradient,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: ExplorerConfig) -> Self {
        let mut state = Self {
            selection: config.initial_selection(),
            bin_preset: config.bin_preset,
            filter_scope: config.filter_scope,
            config,
            dataset: None,
            source_path: None,
            active_tab: Tab::default(),
            charts: ChartInputs::default(),
            color_map: ColorMap::default(),
            gradient: CountGradient::new(0, []),
            status_message: None,
        };
        state.refresh();
        state
    }

    /// Load `path`, replacing the current dataset on success. On failure the
    /// previous dataset stays and the error is shown in the status line.
    pub fn load(&mut self, path: &Path) {
        match load_file(path) {
            Ok(dataset) => {
                self.source_path = Some(path.to_path_buf());
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("{e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Ingest a newly loaded dataset and reset the selection to the
    /// configured defaults.
    pub fn set_dataset(&mut self, dataset: MeteoriteDataset) {
        if dataset.is_empty() {
            log::warn!("Loaded dataset has no records");
        }
        self.selection = self.config.initial_selection();
        self.color_map = ColorMap::new(&dataset.recclasses);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh();
    }

    pub fn boundaries(&self) -> BinBoundaries {
        self.config.boundaries(self.bin_preset)
    }

    /// Re-run the pipeline from scratch for the current selection.
    pub fn refresh(&mut self) {
        self.selection.clamp_years(self.config.year_bounds);
        let boundaries = self.boundaries();
        self.charts = match &self.dataset {
            Some(ds) => prepare(ds, &self.selection, &boundaries, self.filter_scope),
            None => ChartInputs::default(),
        };
        self.gradient = CountGradient::new(
            boundaries.bin_count(),
            self.charts.bins.iter().map(|b| b.count),
        );
    }

    // ---- Selection edits ----

    pub fn toggle_recclass(&mut self, recclass: &str) {
        self.selection.toggle_recclass(recclass);
        self.refresh();
    }

    pub fn toggle_fall(&mut self, fall: Fall) {
        if !self.selection.falls.remove(&fall) {
            self.selection.falls.insert(fall);
        }
        self.refresh();
    }

    pub fn select_all_recclasses(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selection.set_recclasses(ds.recclasses.iter().cloned());
            self.refresh();
        }
    }

    pub fn select_no_recclasses(&mut self) {
        self.selection.set_recclasses(Vec::<String>::new());
        self.refresh();
    }

    /// Move the lower year bound, dragging the upper one along if needed.
    pub fn set_year_lo(&mut self, lo: i32) {
        self.selection.year_range.0 = lo;
        if self.selection.year_range.1 < lo {
            self.selection.year_range.1 = lo;
        }
        self.refresh();
    }

    /// Move the upper year bound, dragging the lower one along if needed.
    pub fn set_year_hi(&mut self, hi: i32) {
        self.selection.year_range.1 = hi;
        if self.selection.year_range.0 > hi {
            self.selection.year_range.0 = hi;
        }
        self.refresh();
    }

    pub fn set_bin_preset(&mut self, preset: BinPreset) {
        if self.bin_preset != preset {
            self.bin_preset = preset;
            self.refresh();
        }
    }

    pub fn set_filter_scope(&mut self, scope: FilterScope) {
        if self.filter_scope != scope {
            self.filter_scope = scope;
            self.refresh();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::MeteoriteRecord;

    fn record(name: &str, recclass: &str, fall: Fall, year: i32, mass: f64) -> MeteoriteRecord {
        let mut r = MeteoriteRecord::new(name, recclass);
        r.fall = Some(fall);
        r.year = Some(year);
        r.mass_g = Some(mass);
        r
    }

    fn loaded_state() -> AppState {
        let mut state = AppState::new(ExplorerConfig::default());
        state.set_dataset(MeteoriteDataset::from_records(vec![
            record("a", "L6", Fall::Fell, 1900, 10.0),
            record("b", "L6", Fall::Found, 1950, 2_000.0),
            record("c", "H5", Fall::Fell, 2000, 50.0),
        ]));
        state
    }

    #[test]
    fn descriptive_tabs_carry_heading_and_text() {
        assert_eq!(Tab::MassVsYear.heading(), None);
        assert_eq!(Tab::MassVsCount.heading(), Some("Masses of Meteorites"));
        assert_eq!(Tab::Location.heading(), Some("Locations of Meteorites"));
        for tab in [Tab::MassVsCount, Tab::Location] {
            assert_eq!(tab.about().len(), 2);
        }
        assert!(Tab::Location.about()[0].contains("longitude and latitude"));
        assert!(Tab::MassVsCount.about()[0].contains("one million"));
    }

    #[test]
    fn starts_with_configured_defaults() {
        let state = loaded_state();
        assert_eq!(state.charts.filtered_count, 2);
        assert_eq!(state.charts.title, "Mass vs Year for L6 (All meteors)");
        assert_eq!(state.bin_preset, BinPreset::Combined);
        assert_eq!(state.active_tab, Tab::MassVsYear);
    }

    #[test]
    fn toggles_recompute_charts() {
        let mut state = loaded_state();
        state.toggle_fall(Fall::Fell);
        assert_eq!(state.charts.filtered_count, 1);
        state.toggle_recclass("H5");
        assert_eq!(state.charts.filtered_count, 2);
        state.toggle_fall(Fall::Fell);
        assert_eq!(state.charts.filtered_count, 3);
    }

    #[test]
    fn select_none_empties_line_chart_only() {
        let mut state = loaded_state();
        state.select_no_recclasses();
        assert_eq!(state.charts.filtered_count, 0);
        assert!(state.charts.line_series.is_empty());
        // Histogram still covers the whole table by default.
        assert_eq!(state.charts.bins.iter().map(|b| b.count).sum::<usize>(), 3);

        state.set_filter_scope(FilterScope::AllCharts);
        assert_eq!(state.charts.bins.iter().map(|b| b.count).sum::<usize>(), 0);

        state.select_all_recclasses();
        assert_eq!(state.charts.filtered_count, 3);
    }

    #[test]
    fn year_sliders_keep_order() {
        let mut state = loaded_state();
        state.set_year_lo(1960);
        assert_eq!(state.selection.year_range, (1960, 2013));
        state.set_year_hi(1920);
        assert_eq!(state.selection.year_range, (1920, 1920));
        state.set_year_lo(3000);
        assert_eq!(state.selection.year_range, (2013, 2013));
    }

    #[test]
    fn preset_switch_changes_bin_count() {
        let mut state = loaded_state();
        assert_eq!(state.charts.bins.len(), 8);
        state.set_bin_preset(BinPreset::Simple);
        assert_eq!(state.charts.bins.len(), 11);
    }

    #[test]
    fn failed_load_keeps_dataset() {
        let mut state = loaded_state();
        state.load(Path::new("/nonexistent/landings.csv"));
        assert!(state.status_message.as_deref().unwrap().starts_with("Error:"));
        assert_eq!(state.dataset.as_ref().map(MeteoriteDataset::len), Some(3));
    }
}
