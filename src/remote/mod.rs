//! Remote assets: the decorative animation and the world basemap. Both are
//! optional; when a fetch fails the UI shows a placeholder and the charts keep
//! working.

pub mod fetch;
pub mod lottie;
pub mod slot;
pub mod topojson;

use std::sync::Arc;

pub use fetch::{AssetCache, Fetch, HttpFetcher};
pub use lottie::AnimationSummary;
pub use slot::AssetSlot;
pub use topojson::{Basemap, decode_topojson};

/// Start fetching and decoding the animation header.
pub fn load_animation<F: Fetch + 'static>(
    cache: &Arc<AssetCache<F>>,
    url: Option<&str>,
) -> AssetSlot<AnimationSummary> {
    let Some(url) = url.map(str::to_string) else {
        return AssetSlot::Idle;
    };
    let cache = Arc::clone(cache);
    AssetSlot::start(move || {
        let document = cache.fetch_json(&url)?;
        AnimationSummary::from_json(&url, &document)
    })
}

/// Start fetching and decoding the basemap topology.
pub fn load_basemap<F: Fetch + 'static>(
    cache: &Arc<AssetCache<F>>,
    url: Option<&str>,
    object: &str,
) -> AssetSlot<Basemap> {
    let Some(url) = url.map(str::to_string) else {
        return AssetSlot::Idle;
    };
    let cache = Arc::clone(cache);
    let object = object.to_string();
    AssetSlot::start(move || {
        let document = cache.fetch_json(&url)?;
        decode_topojson(&url, &document, &object)
    })
}
