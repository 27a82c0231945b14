//! Domain types: cameras, measurements and derived jam events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a roadside traffic camera.
pub type CameraId = i64;

/// Identifier assigned to a stored measurement.
pub type MeasurementId = i64;

/// One camera's vehicle count and average speed over a bounded time window.
///
/// Immutable once stored; the only mutation path is an explicit correction
/// through [`crate::TrafficEngine::correct`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Store-assigned identifier.
    pub id: MeasurementId,
    /// Camera that produced this measurement.
    pub camera_id: CameraId,
    /// Start of the observation window.
    pub start_time: DateTime<Utc>,
    /// End of the observation window, always `>= start_time`.
    pub end_time: DateTime<Utc>,
    /// Vehicles counted during the window.
    pub vehicle_count: u64,
    /// Mean speed over the window, in km/h.
    pub average_speed: f64,
}

/// Measurement payload as submitted by a camera, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeasurement {
    /// Camera that produced this measurement.
    pub camera_id: CameraId,
    /// Start of the observation window.
    pub start_time: DateTime<Utc>,
    /// End of the observation window.
    pub end_time: DateTime<Utc>,
    /// Vehicles counted during the window.
    pub vehicle_count: u64,
    /// Mean speed over the window, in km/h.
    pub average_speed: f64,
}

/// Static reference data for one camera installation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Camera identifier.
    pub id: CameraId,
    /// Latitude of the installation (±90).
    pub latitude: f64,
    /// Longitude of the installation (±180).
    pub longitude: f64,
    /// Human-readable display alias.
    pub alias: String,
    /// City the camera is installed in.
    pub city: String,
}

/// Derived fact: a camera's state was classified as [`TrafficState::Jam`]
/// at `event_time`. Append-only; produced exclusively by the ingestion
/// trigger, never by a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JamEvent {
    /// Store-assigned identifier.
    pub id: i64,
    /// Camera the jam was detected at.
    pub camera_id: CameraId,
    /// When the classification fired (trigger time, not measurement end time).
    pub event_time: DateTime<Utc>,
}

/// Discrete congestion level for a single camera, ordered by severity.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TrafficState {
    /// Traffic moving faster than the camera's baseline: free-flowing.
    Low,
    /// Speeds near the baseline.
    Regular,
    /// Speeds well below the baseline.
    High,
    /// Near-standstill traffic.
    Jam,
}

impl std::fmt::Display for TrafficState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            TrafficState::Low => "low",
            TrafficState::Regular => "regular",
            TrafficState::High => "high",
            TrafficState::Jam => "jam",
        };
        f.write_str(label)
    }
}
