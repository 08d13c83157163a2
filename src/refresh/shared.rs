//! Dataset snapshot shared between the refresher and the HTTP handlers.

use crate::charts::{build_dashboard, Dashboard};
use crate::data::{Area, Datasets};
use dashmap::DashMap;
use std::sync::{Arc, RwLock};

/// Current dataset snapshot plus the charts computed from it.
///
/// Readers clone the `Arc` and never block the refresher for longer than
/// the pointer swap. Cached charts belong to one snapshot and are dropped
/// when it is replaced.
#[derive(Debug, Default)]
pub struct SharedDatasets {
    current: RwLock<Arc<Datasets>>,
    charts: DashMap<(Area, usize), Arc<Dashboard>>,
}

impl SharedDatasets {
    pub fn new(datasets: Datasets) -> Self {
        Self {
            current: RwLock::new(Arc::new(datasets)),
            charts: DashMap::new(),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Datasets> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => {
                tracing::warn!("RwLock poisoned in snapshot, recovering");
                Arc::clone(&poisoned.into_inner())
            }
        }
    }

    /// Swap in a new snapshot and invalidate the chart cache.
    pub fn replace(&self, datasets: Datasets) {
        let next = Arc::new(datasets);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("RwLock poisoned in replace, recovering");
                poisoned.into_inner()
            }
        };
        *guard = next;
        // cleared before the write lock is released so no stale insert can follow
        self.charts.clear();
    }

    /// Charts for one selection, computed once per snapshot.
    pub fn dashboard(&self, area: Area, window: usize) -> Arc<Dashboard> {
        if let Some(cached) = self.charts.get(&(area, window)) {
            return Arc::clone(cached.value());
        }

        let snapshot = self.snapshot();
        let dashboard = Arc::new(build_dashboard(&snapshot, area, window));

        self.cache_if_current(&snapshot, (area, window), Arc::clone(&dashboard));
        dashboard
    }

    /// Cache charts built from `built_from` unless a newer snapshot has been
    /// swapped in meanwhile. The check and the insert happen under the read
    /// lock, so they cannot interleave with `replace`.
    fn cache_if_current(
        &self,
        built_from: &Arc<Datasets>,
        key: (Area, usize),
        dashboard: Arc<Dashboard>,
    ) -> bool {
        let guard = match self.current.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if !Arc::ptr_eq(built_from, &guard) {
            return false;
        }
        self.charts.insert(key, dashboard);
        true
    }

    /// Number of cached selections.
    pub fn cached_charts(&self) -> usize {
        self.charts.len()
    }
}
