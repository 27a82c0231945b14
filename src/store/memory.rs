//! In-memory [`RecordStore`] used by the tests and the demo binary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::StoreError;
use crate::filter::{JamEventFilter, MeasurementFilter};
use crate::model::{Camera, CameraId, JamEvent, Measurement, MeasurementId, NewMeasurement};
use crate::store::RecordStore;

/// Thread-safe in-memory record store.
///
/// Holds everything behind one `RwLock`, so every read observes a consistent
/// snapshot and writes serialize naturally. Good enough for tests and demos;
/// a durable backend would implement [`RecordStore`] against real storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cameras: HashMap<CameraId, Camera>,
    measurements: Vec<Measurement>,
    jam_events: Vec<JamEvent>,
    next_measurement_id: MeasurementId,
    next_event_id: i64,
}

impl Inner {
    fn city_of(&self, camera_id: CameraId) -> Option<&str> {
        self.cameras.get(&camera_id).map(|c| c.city.as_str())
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of measurements currently held.
    pub fn measurement_count(&self) -> usize {
        self.inner.read().measurements.len()
    }

    /// Number of jam events currently held.
    pub fn jam_event_count(&self) -> usize {
        self.inner.read().jam_events.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn latest_measurement(
        &self,
        camera_id: CameraId,
    ) -> Result<Option<Measurement>, StoreError> {
        let inner = self.inner.read();
        // max_by_key keeps the last element on ties, so equal end times
        // resolve to the most recently inserted measurement.
        Ok(inner
            .measurements
            .iter()
            .filter(|m| m.camera_id == camera_id)
            .max_by_key(|m| m.end_time)
            .cloned())
    }

    async fn average_speed(&self, camera_id: CameraId) -> Result<Option<f64>, StoreError> {
        let inner = self.inner.read();
        let speeds: Vec<f64> = inner
            .measurements
            .iter()
            .filter(|m| m.camera_id == camera_id)
            .map(|m| m.average_speed)
            .collect();
        if speeds.is_empty() {
            return Ok(None);
        }
        Ok(Some(speeds.iter().sum::<f64>() / speeds.len() as f64))
    }

    async fn query_measurements(
        &self,
        filter: &MeasurementFilter,
    ) -> Result<Vec<Measurement>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .measurements
            .iter()
            .filter(|m| filter.matches(m, inner.city_of(m.camera_id)))
            .cloned()
            .collect())
    }

    async fn insert_measurement(&self, new: NewMeasurement) -> Result<Measurement, StoreError> {
        let mut inner = self.inner.write();
        inner.next_measurement_id += 1;
        let measurement = Measurement {
            id: inner.next_measurement_id,
            camera_id: new.camera_id,
            start_time: new.start_time,
            end_time: new.end_time,
            vehicle_count: new.vehicle_count,
            average_speed: new.average_speed,
        };
        inner.measurements.push(measurement.clone());
        Ok(measurement)
    }

    async fn insert_jam_event(
        &self,
        camera_id: CameraId,
        event_time: DateTime<Utc>,
    ) -> Result<JamEvent, StoreError> {
        let mut inner = self.inner.write();
        inner.next_event_id += 1;
        let event = JamEvent {
            id: inner.next_event_id,
            camera_id,
            event_time,
        };
        inner.jam_events.push(event.clone());
        Ok(event)
    }

    async fn update_measurement(
        &self,
        id: MeasurementId,
        vehicle_count: u64,
        average_speed: f64,
    ) -> Result<Measurement, StoreError> {
        let mut inner = self.inner.write();
        let measurement = inner
            .measurements
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(StoreError::MissingRecord(id))?;
        measurement.vehicle_count = vehicle_count;
        measurement.average_speed = average_speed;
        Ok(measurement.clone())
    }

    async fn delete_measurement(&self, id: MeasurementId) -> Result<(), StoreError> {
        let mut inner = self.inner.write();
        let before = inner.measurements.len();
        inner.measurements.retain(|m| m.id != id);
        if inner.measurements.len() == before {
            return Err(StoreError::MissingRecord(id));
        }
        Ok(())
    }

    async fn query_jam_events(
        &self,
        filter: &JamEventFilter,
    ) -> Result<Vec<JamEvent>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .jam_events
            .iter()
            .filter(|e| filter.matches(e, inner.city_of(e.camera_id)))
            .cloned()
            .collect())
    }

    async fn cameras(&self, city: Option<&str>) -> Result<Vec<Camera>, StoreError> {
        let inner = self.inner.read();
        let mut cameras: Vec<Camera> = inner
            .cameras
            .values()
            .filter(|c| city.map_or(true, |wanted| c.city == wanted))
            .cloned()
            .collect();
        cameras.sort_by_key(|c| c.id);
        Ok(cameras)
    }

    async fn add_camera(&self, camera: Camera) -> Result<(), StoreError> {
        self.inner.write().cameras.insert(camera.id, camera);
        Ok(())
    }
}
