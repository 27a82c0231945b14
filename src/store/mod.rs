//! Record store seam between the engine and durable storage.
//!
//! The engine never talks to a database directly; it consumes the
//! capabilities below from an injected [`RecordStore`] handle and treats
//! every query as a consistent snapshot. [`MemoryStore`] is the reference
//! implementation used by the tests and the demo binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::filter::{JamEventFilter, MeasurementFilter};
use crate::model::{Camera, CameraId, JamEvent, Measurement, MeasurementId, NewMeasurement};

/// In-memory store implementation
pub mod memory;

pub use memory::MemoryStore;

/// Query and write capabilities the engine requires from storage.
///
/// All reads are point-in-time snapshots; ordering guarantees are stated per
/// method. Implementations are expected to carry their own timeout/retry
/// policy and surface failures as [`StoreError::Unavailable`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// The most recent measurement for a camera, latest by end time.
    async fn latest_measurement(
        &self,
        camera_id: CameraId,
    ) -> Result<Option<Measurement>, StoreError>;

    /// Mean average speed across all historical measurements for a camera,
    /// or `None` when the camera has no measurements.
    async fn average_speed(&self, camera_id: CameraId) -> Result<Option<f64>, StoreError>;

    /// All measurements matching the filter, in no particular order.
    async fn query_measurements(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<Vec<Measurement>, StoreError>;

    /// Persist a new measurement and return the stored copy with its id.
    async fn insert_measurement(&self, new: NewMeasurement) -> Result<Measurement, StoreError>;

    /// Append a jam event for a camera.
    async fn insert_jam_event(
        &self,
        camera_id: CameraId,
        event_time: DateTime<Utc>,
    ) -> Result<JamEvent, StoreError>;

    /// Overwrite the vehicle count and average speed of a stored measurement.
    async fn update_measurement(
        &self,
        id: MeasurementId,
        vehicle_count: u64,
        average_speed: f64,
    ) -> Result<Measurement, StoreError>;

    /// Remove a stored measurement.
    async fn delete_measurement(&self, id: MeasurementId) -> Result<(), StoreError>;

    /// All jam events matching the filter.
    async fn query_jam_events(
        &self,
        filter: &JamEventFilter,
    ) -> Result<Vec<JamEvent>, StoreError>;

    /// Camera reference data, optionally restricted to one city.
    async fn cameras(&self, city: Option<&str>) -> Result<Vec<Camera>, StoreError>;

    /// Register a camera's reference data.
    async fn add_camera(&self, camera: Camera) -> Result<(), StoreError>;
}
