//! The traffic analytics engine.
//!
//! [`TrafficEngine`] is a cheap-to-clone handle over an injected
//! [`RecordStore`]. All reporting operations are stateless, read-only
//! queries and may run concurrently without coordination; the only writer
//! is the ingestion path, which serializes per camera (see
//! [`TrafficEngine::record`]).

use dashmap::DashMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::ClassifierThresholds;
use crate::error::Result;
use crate::filter::MeasurementFilter;
use crate::model::{Camera, CameraId};
use crate::store::RecordStore;

mod classify;
mod congestion;
mod ingest;
mod peaks;
mod stats;

pub use congestion::{CongestionReport, CongestionStatus};
pub use ingest::{IngestReport, JamAlertOutcome};
pub use peaks::PeakHour;
pub use stats::RangeStats;

/// Stateless analytics engine over a record store.
#[derive(Clone)]
pub struct TrafficEngine {
    store: Arc<dyn RecordStore>,
    thresholds: ClassifierThresholds,
    // One mutex per camera so concurrent ingestions for the same camera
    // cannot both classify against a stale "latest" measurement.
    ingest_locks: Arc<DashMap<CameraId, Arc<Mutex<()>>>>,
}

impl TrafficEngine {
    /// Create an engine with the default classifier thresholds.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self::with_thresholds(store, ClassifierThresholds::default())
    }

    /// Create an engine with explicit classifier thresholds.
    pub fn with_thresholds(store: Arc<dyn RecordStore>, thresholds: ClassifierThresholds) -> Self {
        Self {
            store,
            thresholds,
            ingest_locks: Arc::new(DashMap::new()),
        }
    }

    /// The classifier thresholds this engine was built with.
    pub fn thresholds(&self) -> ClassifierThresholds {
        self.thresholds
    }

    pub(crate) fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub(crate) fn camera_lock(&self, camera_id: CameraId) -> Arc<Mutex<()>> {
        self.ingest_locks
            .entry(camera_id)
            .or_default()
            .clone()
    }

    /// Camera reference data, optionally restricted to one city.
    pub async fn cameras(&self, city: Option<&str>) -> Result<Vec<Camera>> {
        Ok(self.store.cameras(city).await?)
    }

    /// Every city with at least one registered camera, deduplicated and sorted.
    pub async fn cities(&self) -> Result<Vec<String>> {
        let cameras = self.store.cameras(None).await?;
        let cities: BTreeSet<String> = cameras.into_iter().map(|c| c.city).collect();
        Ok(cities.into_iter().collect())
    }
}

/// Shape the optional camera/city/time parameters every report accepts
/// into a [`MeasurementFilter`].
pub(crate) fn shape_filter(
    camera_id: Option<CameraId>,
    city: Option<&str>,
    start: Option<chrono::DateTime<chrono::Utc>>,
    end: Option<chrono::DateTime<chrono::Utc>>,
) -> MeasurementFilter {
    let mut filter = MeasurementFilter::new();
    if let Some(id) = camera_id {
        filter = filter.camera(id);
    }
    if let Some(city) = city {
        filter = filter.city(city);
    }
    if let Some(start) = start {
        filter = filter.since(start);
    }
    if let Some(end) = end {
        filter = filter.until(end);
    }
    filter
}
