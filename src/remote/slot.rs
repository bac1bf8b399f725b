use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::ExplorerError;

/// A remote-derived value as the UI sees it. The fetch runs on a worker
/// thread; the frame loop calls [`AssetSlot::poll`] and never blocks.
pub enum AssetSlot<T> {
    /// No fetch was requested (asset disabled in the config).
    Idle,
    Pending {
        rx: Receiver<Result<T, ExplorerError>>,
        started: Instant,
    },
    Ready(T),
    /// Fetch failed or timed out. Holds the message shown in the placeholder.
    Unavailable(String),
}

impl<T> Default for AssetSlot<T> {
    fn default() -> Self {
        AssetSlot::Idle
    }
}

impl<T: Send + 'static> AssetSlot<T> {
    /// Run `job` on a background thread and return a pending slot.
    pub fn start<F>(job: F) -> Self
    where
        F: FnOnce() -> Result<T, ExplorerError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            // Receiver gone means the slot was replaced; nothing to report.
            let _ = tx.send(job());
        });
        AssetSlot::Pending {
            rx,
            started: Instant::now(),
        }
    }
}

impl<T> AssetSlot<T> {
    /// Collect a finished result, or give up after `timeout`. Returns `true`
    /// when the slot changed state.
    pub fn poll(&mut self, timeout: Duration) -> bool {
        let next = match self {
            AssetSlot::Pending { rx, started } => match rx.try_recv() {
                Ok(Ok(value)) => AssetSlot::Ready(value),
                Ok(Err(e)) => {
                    log::warn!("{e}");
                    AssetSlot::Unavailable(e.to_string())
                }
                Err(TryRecvError::Empty) => {
                    if started.elapsed() < timeout {
                        return false;
                    }
                    log::warn!("Remote asset timed out after {}s", timeout.as_secs());
                    AssetSlot::Unavailable(format!("timed out after {}s", timeout.as_secs()))
                }
                Err(TryRecvError::Disconnected) => {
                    AssetSlot::Unavailable("fetch worker stopped".to_string())
                }
            },
            _ => return false,
        };
        *self = next;
        true
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, AssetSlot::Pending { .. })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            AssetSlot::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            AssetSlot::Unavailable(reason) => Some(reason),
            _ => None,
        }
    }
}
