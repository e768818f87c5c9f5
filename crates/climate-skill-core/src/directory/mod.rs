// ── Device directory ──
//
// Read-mostly cache of the registry's climate devices. Readers load the
// current snapshot through an atomic pointer and never block; refresh
// builds a complete replacement and swaps it in, so a reader sees either
// the old or the new device set, never a mix.

mod snapshot;

use std::sync::Arc;
use std::time::Duration;

use arc_swap::{ArcSwap, ArcSwapOption};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::CoreError;
use crate::model::Device;
use crate::registry::DeviceRegistry;

pub use snapshot::DirectorySnapshot;

/// Upper bound on a lazy first load, including waiting for one in flight.
const FIRST_LOAD_TIMEOUT: Duration = Duration::from_secs(10);
/// Quiet period after a failed first load before the registry is asked again.
const FIRST_LOAD_RETRY: Duration = Duration::from_secs(5);

/// Outcome of a successful refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub loaded: usize,
    pub rejected: usize,
}

/// Shared device cache, keyed by room.
pub struct Directory {
    registry: Arc<dyn DeviceRegistry>,
    snapshot: ArcSwap<DirectorySnapshot>,
    /// Serializes refreshes so a slow fetch cannot overwrite a newer one.
    refresh_lock: Mutex<()>,
    /// When the last lazy first load failed, if it did.
    first_load_failed_at: ArcSwapOption<Instant>,
}

impl Directory {
    /// An empty, not-yet-loaded directory backed by `registry`.
    pub fn new(registry: Arc<dyn DeviceRegistry>) -> Self {
        Self {
            registry,
            snapshot: ArcSwap::from_pointee(DirectorySnapshot::empty()),
            refresh_lock: Mutex::new(()),
            first_load_failed_at: ArcSwapOption::empty(),
        }
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<DirectorySnapshot> {
        self.snapshot.load_full()
    }

    /// Devices in `rooms`, in caller room order then registry order.
    pub fn devices_for<S: AsRef<str>>(&self, rooms: &[S]) -> Vec<Arc<Device>> {
        self.snapshot.load().devices_for(rooms)
    }

    pub fn rooms(&self) -> Vec<String> {
        self.snapshot.load().rooms().map(str::to_owned).collect()
    }

    pub fn device_count(&self) -> usize {
        self.snapshot.load().device_count()
    }

    /// Whether any refresh has completed.
    pub fn is_loaded(&self) -> bool {
        self.snapshot.load().loaded_at().is_some()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Rebuild the snapshot from the registry and swap it in.
    ///
    /// On a registry failure the previous snapshot stays in place.
    pub async fn refresh(&self) -> Result<RefreshSummary, CoreError> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Load the directory if no refresh has completed yet.
    ///
    /// Returns `None` when the directory was already loaded. The attempt,
    /// including any wait for a load already in flight, is bounded by
    /// [`FIRST_LOAD_TIMEOUT`]; after a failure, calls within
    /// [`FIRST_LOAD_RETRY`] fail immediately without touching the registry.
    pub async fn ensure_loaded(&self) -> Result<Option<RefreshSummary>, CoreError> {
        if self.is_loaded() {
            return Ok(None);
        }
        if let Some(failed_at) = self.first_load_failed_at.load_full() {
            if failed_at.elapsed() < FIRST_LOAD_RETRY {
                return Err(CoreError::Registry {
                    message: "first device load failed recently, not retrying yet".into(),
                });
            }
        }

        let load = async {
            let _guard = self.refresh_lock.lock().await;
            // Another task may have finished loading while we waited.
            if self.is_loaded() {
                return Ok(None);
            }
            debug!("directory not loaded yet, refreshing on first access");
            self.refresh_locked().await.map(Some)
        };
        let result = tokio::time::timeout(FIRST_LOAD_TIMEOUT, load)
            .await
            .unwrap_or_else(|_| {
                Err(CoreError::Registry {
                    message: format!(
                        "no answer within {}s on first load",
                        FIRST_LOAD_TIMEOUT.as_secs()
                    ),
                })
            });

        match &result {
            Ok(_) => self.first_load_failed_at.store(None),
            Err(e) => {
                debug!(error = %e, retry_in_secs = FIRST_LOAD_RETRY.as_secs(), "first device load failed");
                self.first_load_failed_at.store(Some(Arc::new(Instant::now())));
            }
        }
        result
    }

    /// Swap in a prepared snapshot, bypassing the registry.
    pub(crate) fn replace(&self, snapshot: DirectorySnapshot) {
        self.snapshot.store(Arc::new(snapshot));
    }

    async fn refresh_locked(&self) -> Result<RefreshSummary, CoreError> {
        let records = self.registry.fetch_devices().await?;
        let snapshot = DirectorySnapshot::from_records(&records);
        let summary = RefreshSummary {
            loaded: snapshot.device_count(),
            rejected: snapshot.rejected(),
        };
        self.replace(snapshot);
        info!(
            loaded = summary.loaded,
            rejected = summary.rejected,
            "device directory refreshed"
        );
        Ok(summary)
    }
}
