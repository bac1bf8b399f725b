use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::binning::{BinBoundaries, BinPreset};
use crate::data::filter::FilterSelection;
use crate::data::model::Fall;
use crate::data::pipeline::FilterScope;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "METEORITE_EXPLORER_CONFIG";
/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "meteorite-explorer.json";

pub const DEFAULT_DATA_PATH: &str = "Meteorite_Landings.csv";
pub const DEFAULT_ANIMATION_URL: &str =
    "https://lottie.host/2314d9b4-f9d3-4b90-bc4c-dc91961373f4/XT3H1PyKLY.json";
pub const DEFAULT_TOPOLOGY_URL: &str =
    "https://raw.githubusercontent.com/deldersveld/topojson/master/world-continents.json";

// ---------------------------------------------------------------------------
// Explorer configuration
// ---------------------------------------------------------------------------

/// Startup configuration. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    pub data_path: PathBuf,
    /// Recclasses selected when a dataset is first shown.
    pub default_recclasses: Vec<String>,
    /// Fall values selected at startup. Empty means no fall filter.
    pub default_falls: Vec<Fall>,
    /// Limits of the year sliders, inclusive.
    pub year_bounds: (i32, i32),
    pub bin_preset: BinPreset,
    /// Used when `bin_preset` is `Custom`.
    pub custom_boundaries: Option<Vec<f64>>,
    pub filter_scope: FilterScope,
    /// `None` disables the decorative animation banner.
    pub animation_url: Option<String>,
    /// `None` draws the map without a basemap.
    pub topology_url: Option<String>,
    /// Name of the object inside the TopoJSON document.
    pub topology_object: String,
    pub fetch_timeout_secs: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            default_recclasses: vec!["L6".to_string()],
            default_falls: Vec::new(),
            year_bounds: (1880, 2013),
            bin_preset: BinPreset::default(),
            custom_boundaries: None,
            filter_scope: FilterScope::default(),
            animation_url: Some(DEFAULT_ANIMATION_URL.to_string()),
            topology_url: Some(DEFAULT_TOPOLOGY_URL.to_string()),
            topology_object: "continent".to_string(),
            fetch_timeout_secs: 10,
        }
    }
}

impl ExplorerConfig {
    /// Read a config file and validate it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: ExplorerConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Locate and read the config: `$METEORITE_EXPLORER_CONFIG` first, then
    /// `meteorite-explorer.json` in the working directory. With neither
    /// present the defaults apply.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::from_file(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::from_file(local);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        let (lo, hi) = self.year_bounds;
        if lo > hi {
            anyhow::bail!("year_bounds must be ascending, got ({lo}, {hi})");
        }
        if self.bin_preset == BinPreset::Custom && self.custom_boundaries.is_none() {
            anyhow::bail!("bin_preset is Custom but custom_boundaries is not set");
        }
        if let Some(custom) = &self.custom_boundaries {
            BinBoundaries::new(custom.clone()).context("invalid custom_boundaries")?;
        }
        Ok(())
    }

    /// Boundaries for `preset`. Falls back to the combined set when a custom
    /// preset has no usable boundaries.
    pub fn boundaries(&self, preset: BinPreset) -> BinBoundaries {
        match preset {
            BinPreset::Simple => BinBoundaries::simple(),
            BinPreset::Combined => BinBoundaries::combined(),
            BinPreset::Custom => self
                .custom_boundaries
                .clone()
                .and_then(|b| BinBoundaries::new(b).ok())
                .unwrap_or_else(BinBoundaries::combined),
        }
    }

    /// Presets the side panel offers.
    pub fn available_presets(&self) -> Vec<BinPreset> {
        let mut presets = vec![BinPreset::Simple, BinPreset::Combined];
        if self.custom_boundaries.is_some() {
            presets.push(BinPreset::Custom);
        }
        presets
    }

    /// The selection a freshly loaded dataset starts with.
    pub fn initial_selection(&self) -> FilterSelection {
        FilterSelection::new(
            self.default_recclasses.iter().cloned(),
            self.default_falls.iter().copied(),
            self.year_bounds,
        )
    }

    pub fn fetch_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.fetch_timeout_secs)
    }
}
