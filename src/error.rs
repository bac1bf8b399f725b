use std::path::PathBuf;

use thiserror::Error;

/// The two failure kinds the explorer distinguishes.
///
/// Everything downstream of a successful load (filtering, binning, map
/// projection) is total and never produces an error.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The meteorite table is missing or corrupt. Fatal for the dataset.
    #[error("meteorite data unavailable ({}): {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },

    /// A decorative or basemap asset could not be fetched or decoded.
    /// Charts render without it.
    #[error("remote asset unavailable ({url}): {reason}")]
    RemoteAssetUnavailable { url: String, reason: String },
}

impl ExplorerError {
    pub fn remote(url: &str, reason: impl Into<String>) -> Self {
        ExplorerError::RemoteAssetUnavailable {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}
