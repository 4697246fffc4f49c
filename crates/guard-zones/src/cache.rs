use std::sync::{Arc, RwLock};

use guard_proto::HazardZone;
use time::OffsetDateTime;
use tracing::info;

use crate::directory::{FetchError, ZoneDirectory};

/// The zone set as of one successful fetch. `fetched_at` is `None` only for
/// the initial empty snapshot, before any fetch has succeeded.
#[derive(Debug, Clone, Default)]
pub struct ZoneSnapshot {
    pub zones: Vec<HazardZone>,
    pub fetched_at: Option<OffsetDateTime>,
}

/// Holds the last successfully fetched zone snapshot. A refresh that fails
/// leaves the committed snapshot in place; staleness by itself is not an
/// error. Commits are a single `Arc` swap, so readers never observe a
/// partially-updated zone list.
pub struct ZoneCache<D> {
    directory: D,
    snapshot: Arc<RwLock<Arc<ZoneSnapshot>>>,
}

impl<D: Clone> Clone for ZoneCache<D> {
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
            snapshot: Arc::clone(&self.snapshot),
        }
    }
}

impl<D: ZoneDirectory> ZoneCache<D> {
    pub fn new(directory: D) -> Self {
        Self {
            directory,
            snapshot: Arc::new(RwLock::new(Arc::new(ZoneSnapshot::default()))),
        }
    }

    /// Fetches the full zone list and commits it as the new snapshot.
    pub async fn refresh(&self) -> Result<(), FetchError> {
        let zones = self.directory.fetch_zones().await?;
        info!("zones: refreshed snapshot ({} zones)", zones.len());
        let snap = Arc::new(ZoneSnapshot {
            zones,
            fetched_at: Some(OffsetDateTime::now_utc()),
        });
        *self.snapshot.write().unwrap() = snap;
        Ok(())
    }

    /// The latest committed snapshot; the initial empty one if no fetch has
    /// ever succeeded.
    pub fn current(&self) -> Arc<ZoneSnapshot> {
        Arc::clone(&self.snapshot.read().unwrap())
    }

    pub fn last_success(&self) -> Option<OffsetDateTime> {
        self.current().fetched_at
    }
}
