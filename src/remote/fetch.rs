use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use serde_json::Value as JsonValue;

use crate::error::ExplorerError;

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Blocking GET of a remote resource.
pub trait Fetch: Send + Sync {
    fn get(&self, url: &str) -> Result<Vec<u8>, ExplorerError>;
}

/// Plain HTTP(S) fetcher. Anything but `200 OK` counts as unavailable.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpFetcher;

impl Fetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<Vec<u8>, ExplorerError> {
        let request = ehttp::Request::get(url);
        let response =
            ehttp::fetch_blocking(&request).map_err(|e| ExplorerError::remote(url, e))?;
        if response.status != 200 {
            return Err(ExplorerError::remote(
                url,
                format!("HTTP {} {}", response.status, response.status_text),
            ));
        }
        Ok(response.bytes)
    }
}

// ---------------------------------------------------------------------------
// Process-wide memo
// ---------------------------------------------------------------------------

type CachedJson = Result<Arc<JsonValue>, String>;

/// Memoizes JSON fetches: the underlying fetcher runs at most once per
/// distinct URL for the lifetime of the cache, failures included. Concurrent
/// callers asking for the same URL wait for the single in-flight fetch.
pub struct AssetCache<F: Fetch = HttpFetcher> {
    fetcher: F,
    entries: Mutex<HashMap<String, Arc<OnceLock<CachedJson>>>>,
}

impl<F: Fetch> AssetCache<F> {
    pub fn new(fetcher: F) -> Self {
        AssetCache {
            fetcher,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch `url` and parse it as JSON, or return the memoized outcome.
    pub fn fetch_json(&self, url: &str) -> Result<Arc<JsonValue>, ExplorerError> {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(entries.entry(url.to_string()).or_default())
        };

        let outcome = cell.get_or_init(|| {
            log::info!("Fetching {url}");
            self.fetcher
                .get(url)
                .and_then(|bytes| {
                    serde_json::from_slice::<JsonValue>(&bytes)
                        .map_err(|e| ExplorerError::remote(url, format!("invalid JSON: {e}")))
                })
                .map(Arc::new)
                .map_err(|e| {
                    log::warn!("{e}");
                    reason_of(e)
                })
        });

        outcome
            .clone()
            .map_err(|reason| ExplorerError::remote(url, reason))
    }

    #[cfg(test)]
    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }
}

fn reason_of(err: ExplorerError) -> String {
    match err {
        ExplorerError::RemoteAssetUnavailable { reason, .. } => reason,
        other => other.to_string(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Serves canned bodies and counts calls per URL.
    #[derive(Default)]
    pub(crate) struct FakeFetcher {
        pub bodies: HashMap<String, String>,
        pub calls: Mutex<HashMap<String, usize>>,
        pub total: AtomicUsize,
    }

    impl FakeFetcher {
        pub fn with(url: &str, body: &str) -> Self {
            let mut fetcher = FakeFetcher::default();
            fetcher.bodies.insert(url.to_string(), body.to_string());
            fetcher
        }

        pub fn calls_for(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }
    }

    impl Fetch for FakeFetcher {
        fn get(&self, url: &str) -> Result<Vec<u8>, ExplorerError> {
            self.total.fetch_add(1, Ordering::SeqCst);
            *self.calls.lock().unwrap().entry(url.to_string()).or_default() += 1;
            self.bodies
                .get(url)
                .map(|b| b.clone().into_bytes())
                .ok_or_else(|| ExplorerError::remote(url, "HTTP 404 Not Found"))
        }
    }

    #[test]
    fn fetches_each_url_once() {
        let cache = AssetCache::new(FakeFetcher::with("https://a/anim.json", r#"{"w": 300}"#));

        for _ in 0..3 {
            let json = cache.fetch_json("https://a/anim.json").unwrap();
            assert_eq!(json["w"], 300);
        }
        assert_eq!(cache.fetcher.calls_for("https://a/anim.json"), 1);
    }

    #[test]
    fn failures_are_memoized_and_recoverable() {
        let cache = AssetCache::new(FakeFetcher::default());

        for _ in 0..2 {
            let err = cache.fetch_json("https://a/missing.json").unwrap_err();
            match err {
                ExplorerError::RemoteAssetUnavailable { url, reason } => {
                    assert_eq!(url, "https://a/missing.json");
                    assert_eq!(reason, "HTTP 404 Not Found");
                }
                other => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(cache.fetcher.calls_for("https://a/missing.json"), 1);
    }

    #[test]
    fn invalid_json_is_unavailable() {
        let cache = AssetCache::new(FakeFetcher::with("https://a/x.json", "<html>"));
        let err = cache.fetch_json("https://a/x.json").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn concurrent_callers_share_one_fetch() {
        let cache = AssetCache::new(FakeFetcher::with("https://a/topo.json", "[1, 2, 3]"));

        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    let json = cache.fetch_json("https://a/topo.json").unwrap();
                    assert_eq!(json.as_array().map(|a| a.len()), Some(3));
                });
            }
        });

        assert_eq!(cache.fetcher.total.load(Ordering::SeqCst), 1);
    }
}
