//! State classifier: one camera's current speed against its own history.

use crate::config::ClassifierThresholds;
use crate::error::{EngineError, Result};
use crate::model::{CameraId, TrafficState};
use crate::store::RecordStore;

use super::TrafficEngine;

impl TrafficEngine {
    /// Classify the current congestion level at one camera.
    ///
    /// Compares the camera's most recent average speed against its
    /// historical baseline (mean speed over all stored measurements for
    /// that camera). Pure read-only query; fails with
    /// [`EngineError::CameraNotFound`] when the camera has no measurements
    /// at all.
    pub async fn classify(&self, camera_id: CameraId) -> Result<TrafficState> {
        let latest = self
            .store()
            .latest_measurement(camera_id)
            .await?
            .ok_or(EngineError::CameraNotFound(camera_id))?;
        let baseline = self.store().average_speed(camera_id).await?.unwrap_or(0.0);
        let state = classify_speed(latest.average_speed, baseline, &self.thresholds());
        tracing::debug!(
            camera = camera_id,
            current = latest.average_speed,
            baseline,
            %state,
            "classified traffic state"
        );
        Ok(state)
    }
}

/// Pure classification rule.
///
/// Bands are checked in severity order (`Low` first) and the first match
/// wins, so a speed sitting exactly on the 1.2x or 0.8x edge resolves to
/// the milder state.
pub(crate) fn classify_speed(
    current: f64,
    baseline: f64,
    thresholds: &ClassifierThresholds,
) -> TrafficState {
    // A camera whose only history is standstill traffic is jammed, not
    // free-flowing: 0/0 sits inside the jam band by definition.
    if baseline <= 0.0 && current <= 0.0 {
        return TrafficState::Jam;
    }
    if current >= thresholds.low_factor * baseline {
        return TrafficState::Low;
    }
    if current >= thresholds.high_factor * baseline {
        return TrafficState::Regular;
    }
    if current > thresholds.jam_factor * baseline {
        return TrafficState::High;
    }
    TrafficState::Jam
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewMeasurement;
    use crate::store::{MemoryStore, RecordStore};
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn classify(current: f64, baseline: f64) -> TrafficState {
        classify_speed(current, baseline, &ClassifierThresholds::default())
    }

    #[test]
    fn test_bands_with_positive_baseline() {
        // baseline 50: edges at 60, 40 and 10.
        assert_eq!(classify(80.0, 50.0), TrafficState::Low);
        assert_eq!(classify(50.0, 50.0), TrafficState::Regular);
        assert_eq!(classify(25.0, 50.0), TrafficState::High);
        assert_eq!(classify(5.0, 50.0), TrafficState::Jam);
    }

    #[test]
    fn test_band_edges_resolve_to_milder_state() {
        // Exactly 1.2x is Low, not Regular; exactly 0.8x is Regular, not High.
        assert_eq!(classify(60.0, 50.0), TrafficState::Low);
        assert_eq!(classify(40.0, 50.0), TrafficState::Regular);
        // Exactly 0.2x falls out of the High band into Jam.
        assert_eq!(classify(10.0, 50.0), TrafficState::Jam);
    }

    #[test]
    fn test_bands_are_exhaustive() {
        let baseline = 50.0;
        let mut speed = 0.0;
        while speed <= 120.0 {
            // Every non-negative speed lands in exactly one state.
            let _ = classify(speed, baseline);
            speed += 0.1;
        }
    }

    #[test]
    fn test_zero_baseline_degenerate_cases() {
        // 0/0 is a jam by definition, never a division error.
        assert_eq!(classify(0.0, 0.0), TrafficState::Jam);
        // Any movement against a zero baseline reads as free-flowing.
        assert_eq!(classify(30.0, 0.0), TrafficState::Low);
    }

    #[tokio::test]
    async fn test_classify_unknown_camera_is_not_found() {
        let engine = TrafficEngine::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            engine.classify(42).await,
            Err(EngineError::CameraNotFound(42))
        ));
    }

    #[tokio::test]
    async fn test_classify_uses_latest_by_end_time() {
        let store = Arc::new(MemoryStore::new());
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        // History at 50 km/h, then a slowdown to 20 km/h.
        for (offset, speed) in [(0, 50.0), (1, 50.0), (2, 20.0)] {
            let start = base + chrono::Duration::hours(offset);
            store
                .insert_measurement(NewMeasurement {
                    camera_id: 1,
                    start_time: start,
                    end_time: start + chrono::Duration::minutes(10),
                    vehicle_count: 30,
                    average_speed: speed,
                })
                .await
                .unwrap();
        }
        let engine = TrafficEngine::new(store);
        // current 20 against baseline 40: inside the (8, 32) band, so High.
        assert_eq!(engine.classify(1).await.unwrap(), TrafficState::High);
    }
}
