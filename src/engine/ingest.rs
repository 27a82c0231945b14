//! Ingestion trigger: persist a measurement, classify, and raise jam events.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{EngineError, Result, StoreError};
use crate::model::{JamEvent, Measurement, MeasurementId, NewMeasurement, TrafficState};
use crate::store::RecordStore;

use super::TrafficEngine;

/// Outcome of the jam-alert step of an ingestion.
#[derive(Debug)]
pub enum JamAlertOutcome {
    /// Classification did not come back as [`TrafficState::Jam`].
    NotTriggered,
    /// A jam event was appended.
    Recorded(JamEvent),
    /// Classification was `Jam` but the event write failed. The measurement
    /// itself is already persisted and is not rolled back; this is a
    /// warning-class failure, distinct from an ingestion error.
    WriteFailed(StoreError),
}

/// What one call to [`TrafficEngine::record`] did.
#[derive(Debug)]
pub struct IngestReport {
    /// The stored measurement.
    pub measurement: Measurement,
    /// The camera's traffic state immediately after the insert.
    pub state: TrafficState,
    /// Whether a jam event was raised, and how that went.
    pub jam_alert: JamAlertOutcome,
}

impl IngestReport {
    /// The jam event this ingestion produced, if any.
    pub fn jam_event(&self) -> Option<&JamEvent> {
        match &self.jam_alert {
            JamAlertOutcome::Recorded(event) => Some(event),
            _ => None,
        }
    }
}

impl TrafficEngine {
    /// Ingest one measurement.
    ///
    /// Validates the payload before any write, persists it, then classifies
    /// the camera with the new record already visible (classifying against
    /// stale data would miss jams). A `Jam` classification appends exactly
    /// one [`JamEvent`] timestamped at trigger time. The whole
    /// insert-classify-alert sequence holds the camera's ingest lock, so
    /// concurrent ingestions for one camera cannot race on "latest".
    pub async fn record(&self, new: NewMeasurement) -> Result<IngestReport> {
        validate(&new)?;

        let lock = self.camera_lock(new.camera_id);
        let _guard = lock.lock().await;

        let measurement = self.store().insert_measurement(new).await?;
        debug!(
            camera = measurement.camera_id,
            id = measurement.id,
            "measurement stored"
        );

        let state = self.classify(measurement.camera_id).await?;
        let jam_alert = if state == TrafficState::Jam {
            match self
                .store()
                .insert_jam_event(measurement.camera_id, Utc::now())
                .await
            {
                Ok(event) => {
                    info!(camera = measurement.camera_id, "traffic jam detected");
                    JamAlertOutcome::Recorded(event)
                }
                Err(err) => {
                    // The measurement write stands; surface the alert
                    // failure to the caller instead of masking it.
                    warn!(
                        camera = measurement.camera_id,
                        error = %err,
                        "jam event write failed, measurement kept"
                    );
                    JamAlertOutcome::WriteFailed(err)
                }
            }
        } else {
            JamAlertOutcome::NotTriggered
        };

        Ok(IngestReport {
            measurement,
            state,
            jam_alert,
        })
    }

    /// Correct a stored measurement's vehicle count and average speed.
    pub async fn correct(
        &self,
        id: MeasurementId,
        vehicle_count: u64,
        average_speed: f64,
    ) -> Result<Measurement> {
        if !average_speed.is_finite() || average_speed < 0.0 {
            return Err(EngineError::InvalidMeasurement(format!(
                "average speed must be a non-negative number, got {average_speed}"
            )));
        }
        Ok(self
            .store()
            .update_measurement(id, vehicle_count, average_speed)
            .await?)
    }

    /// Delete a stored measurement by operator action.
    pub async fn delete(&self, id: MeasurementId) -> Result<()> {
        Ok(self.store().delete_measurement(id).await?)
    }
}

fn validate(new: &NewMeasurement) -> Result<()> {
    if new.end_time < new.start_time {
        return Err(EngineError::InvalidMeasurement(format!(
            "window ends before it starts ({} < {})",
            new.end_time, new.start_time
        )));
    }
    // vehicle_count is unsigned, so only the speed needs a range check.
    if !new.average_speed.is_finite() || new.average_speed < 0.0 {
        return Err(EngineError::InvalidMeasurement(format!(
            "average speed must be a non-negative number, got {}",
            new.average_speed
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RecordStore};
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Arc;

    fn new_measurement(speed: f64) -> NewMeasurement {
        measurement_at(8, speed)
    }

    fn measurement_at(hour: u32, speed: f64) -> NewMeasurement {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
        NewMeasurement {
            camera_id: 1,
            start_time: start,
            end_time: start + chrono::Duration::minutes(10),
            vehicle_count: 30,
            average_speed: speed,
        }
    }

    fn backwards_window() -> NewMeasurement {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        NewMeasurement {
            end_time: start - chrono::Duration::minutes(1),
            ..new_measurement(40.0)
        }
    }

    #[tokio::test]
    async fn test_invalid_measurements_rejected_before_any_write() {
        let store = Arc::new(MemoryStore::new());
        let engine = TrafficEngine::new(store.clone());

        for bad in [
            backwards_window(),
            new_measurement(-3.0),
            new_measurement(f64::NAN),
        ] {
            assert!(matches!(
                engine.record(bad).await,
                Err(EngineError::InvalidMeasurement(_))
            ));
        }
        assert_eq!(store.measurement_count(), 0);
    }

    #[tokio::test]
    async fn test_first_measurement_for_camera_classifies_against_itself() {
        let store = Arc::new(MemoryStore::new());
        let engine = TrafficEngine::new(store.clone());

        // With only itself as history, current == baseline, so Regular;
        // the post-insert visibility is what makes this work at all.
        let report = engine.record(new_measurement(40.0)).await.unwrap();
        assert_eq!(report.state, TrafficState::Regular);
        assert!(matches!(report.jam_alert, JamAlertOutcome::NotTriggered));
        assert_eq!(store.jam_event_count(), 0);
    }

    #[tokio::test]
    async fn test_jam_ingestion_raises_exactly_one_event() {
        let store = Arc::new(MemoryStore::new());
        let engine = TrafficEngine::new(store.clone());

        // Build a healthy baseline around 50 km/h.
        for hour in 8..12 {
            let start = Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
            engine
                .record(NewMeasurement {
                    camera_id: 1,
                    start_time: start,
                    end_time: start + chrono::Duration::minutes(10),
                    vehicle_count: 30,
                    average_speed: 50.0,
                })
                .await
                .unwrap();
        }
        assert_eq!(store.jam_event_count(), 0);

        // A near-standstill reading drops below 0.2x the baseline.
        let report = engine.record(measurement_at(12, 2.0)).await.unwrap();
        assert_eq!(report.state, TrafficState::Jam);
        let event = report.jam_event().expect("jam event should be recorded");
        assert!(event.event_time >= report.measurement.end_time);
        assert_eq!(store.jam_event_count(), 1);
    }

    #[tokio::test]
    async fn test_jam_write_failure_keeps_measurement() {
        struct JamWriteFails(MemoryStore);

        #[async_trait::async_trait]
        impl RecordStore for JamWriteFails {
            async fn latest_measurement(
                &self,
                camera_id: i64,
            ) -> std::result::Result<Option<Measurement>, StoreError> {
                self.0.latest_measurement(camera_id).await
            }
            async fn average_speed(&self, camera_id: i64) -> std::result::Result<Option<f64>, StoreError> {
                self.0.average_speed(camera_id).await
            }
            async fn query_measurements(
                &self,
                filter: &crate::MeasurementFilter,
            ) -> std::result::Result<Vec<Measurement>, StoreError> {
                self.0.query_measurements(filter).await
            }
            async fn insert_measurement(
                &self,
                new: NewMeasurement,
            ) -> std::result::Result<Measurement, StoreError> {
                self.0.insert_measurement(new).await
            }
            async fn insert_jam_event(
                &self,
                _camera_id: i64,
                _event_time: DateTime<Utc>,
            ) -> std::result::Result<JamEvent, StoreError> {
                Err(StoreError::Unavailable("alert table offline".to_string()))
            }
            async fn update_measurement(
                &self,
                id: i64,
                vehicle_count: u64,
                average_speed: f64,
            ) -> std::result::Result<Measurement, StoreError> {
                self.0.update_measurement(id, vehicle_count, average_speed).await
            }
            async fn delete_measurement(&self, id: i64) -> std::result::Result<(), StoreError> {
                self.0.delete_measurement(id).await
            }
            async fn query_jam_events(
                &self,
                filter: &crate::JamEventFilter,
            ) -> std::result::Result<Vec<JamEvent>, StoreError> {
                self.0.query_jam_events(filter).await
            }
            async fn cameras(
                &self,
                city: Option<&str>,
            ) -> std::result::Result<Vec<crate::Camera>, StoreError> {
                self.0.cameras(city).await
            }
            async fn add_camera(&self, camera: crate::Camera) -> std::result::Result<(), StoreError> {
                self.0.add_camera(camera).await
            }
        }

        let store = Arc::new(JamWriteFails(MemoryStore::new()));
        let engine = TrafficEngine::new(store.clone());

        for hour in 8..12 {
            let start = Utc.with_ymd_and_hms(2024, 6, 1, hour, 0, 0).unwrap();
            engine
                .record(NewMeasurement {
                    camera_id: 1,
                    start_time: start,
                    end_time: start + chrono::Duration::minutes(10),
                    vehicle_count: 30,
                    average_speed: 50.0,
                })
                .await
                .unwrap();
        }

        // The jam write fails, but the call still succeeds and the
        // measurement is kept; the failure rides along in the report.
        let report = engine.record(measurement_at(12, 2.0)).await.unwrap();
        assert_eq!(report.state, TrafficState::Jam);
        assert!(matches!(
            report.jam_alert,
            JamAlertOutcome::WriteFailed(StoreError::Unavailable(_))
        ));
        assert_eq!(store.0.measurement_count(), 5);
        assert_eq!(store.0.jam_event_count(), 0);
    }

    #[tokio::test]
    async fn test_correct_and_delete() {
        let store = Arc::new(MemoryStore::new());
        let engine = TrafficEngine::new(store);

        let report = engine.record(new_measurement(40.0)).await.unwrap();
        let id = report.measurement.id;

        let corrected = engine.correct(id, 55, 33.0).await.unwrap();
        assert_eq!(corrected.vehicle_count, 55);

        assert!(matches!(
            engine.correct(id, 55, -1.0).await,
            Err(EngineError::InvalidMeasurement(_))
        ));

        engine.delete(id).await.unwrap();
        assert!(matches!(
            engine.delete(id).await,
            Err(EngineError::Store(StoreError::MissingRecord(_)))
        ));
    }
}
