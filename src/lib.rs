//! Traffic-camera analytics engine.
//!
//! Ingests periodic traffic-camera measurements (vehicle count and average
//! speed over a time window) and derives two kinds of insight: a real-time
//! congestion classification for a single camera, and retrospective
//! aggregate reports (peak-traffic hours, congestion ratios, volume sums)
//! over arbitrary time ranges with optional camera/city filters.
//!
//! Storage is abstracted behind the [`RecordStore`] trait; the engine is a
//! stateless set of computations over whatever store it is handed.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use chrono::Utc;
//! use trafficwatch::{MemoryStore, NewMeasurement, TrafficEngine};
//!
//! # async fn example() -> trafficwatch::Result<()> {
//! let engine = TrafficEngine::new(Arc::new(MemoryStore::new()));
//!
//! let now = Utc::now();
//! let report = engine
//!     .record(NewMeasurement {
//!         camera_id: 1,
//!         start_time: now - chrono::Duration::minutes(10),
//!         end_time: now,
//!         vehicle_count: 42,
//!         average_speed: 55.0,
//!     })
//!     .await?;
//! tracing::info!(state = %report.state, "camera classified");
//!
//! let peaks = engine
//!     .peak_hours(now - chrono::Duration::days(7), now, None, None)
//!     .await?;
//! for peak in peaks {
//!     tracing::info!(hour = %peak.hour_range, vehicles = peak.vehicle_count, "peak hour");
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

// Re-export commonly used items
pub use config::{ClassifierThresholds, DEFAULT_SPEED_THRESHOLD};
pub use engine::{
    CongestionReport, CongestionStatus, IngestReport, JamAlertOutcome, PeakHour, RangeStats,
    TrafficEngine,
};
pub use error::{EngineError, Result, StoreError};
pub use filter::{JamEventFilter, MeasurementFilter};
pub use model::{
    Camera, CameraId, JamEvent, Measurement, MeasurementId, NewMeasurement, TrafficState,
};
pub use store::{MemoryStore, RecordStore};

/// Domain types
pub mod model;

/// Error types
pub mod error;

/// Engine configuration
pub mod config;

/// Shared filter shaping
pub mod filter;

/// Record store seam and in-memory implementation
pub mod store;

/// Classification and aggregation engine
pub mod engine;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber with default settings
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
