/// Error types for the traffic analytics engine
use thiserror::Error;

use crate::model::{CameraId, MeasurementId};

/// Failure reported by the record store collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached or a query failed mid-flight.
    #[error("record store unavailable: {0}")]
    Unavailable(String),

    /// A correction or deletion referenced a measurement that does not exist.
    #[error("no measurement with id {0}")]
    MissingRecord(MeasurementId),
}

/// Main error type for engine operations.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A measurement violated its invariants and was rejected before any write.
    #[error("invalid measurement: {0}")]
    InvalidMeasurement(String),

    /// Classification was requested for a camera with no measurements at all.
    #[error("no measurements recorded for camera {0}")]
    CameraNotFound(CameraId),

    /// The record store failed; propagated unchanged, never masked.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EngineError::InvalidMeasurement("window ends before it starts".to_string());
        assert_eq!(
            err.to_string(),
            "invalid measurement: window ends before it starts"
        );

        let err = EngineError::CameraNotFound(7);
        assert_eq!(err.to_string(), "no measurements recorded for camera 7");
    }

    #[test]
    fn test_store_error_passes_through_unchanged() {
        let store_err = StoreError::Unavailable("connection refused".to_string());
        let rendered = store_err.to_string();
        let err: EngineError = store_err.into();
        assert_eq!(err.to_string(), rendered);
    }
}
