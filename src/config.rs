//! Engine configuration: classification thresholds and report defaults.

use serde::{Deserialize, Serialize};

/// Default speed threshold (km/h) below which a record counts as congested.
pub const DEFAULT_SPEED_THRESHOLD: f64 = 10.0;

/// Ratio thresholds for the state classifier.
///
/// Each factor is multiplied by the camera's baseline speed to form a band
/// edge: `>= low_factor * baseline` is free-flowing, `>= high_factor` is
/// regular, `> jam_factor` is heavy, anything at or below `jam_factor` is a
/// jam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierThresholds {
    /// Lower edge of the free-flowing band, as a multiple of baseline.
    pub low_factor: f64,
    /// Lower edge of the regular band.
    pub high_factor: f64,
    /// Upper edge of the jam band.
    pub jam_factor: f64,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            low_factor: 1.2,
            high_factor: 0.8,
            jam_factor: 0.2,
        }
    }
}

impl ClassifierThresholds {
    /// Build thresholds from the environment, falling back to defaults.
    ///
    /// Honours `TRAFFICWATCH_LOW_FACTOR`, `TRAFFICWATCH_HIGH_FACTOR` and
    /// `TRAFFICWATCH_JAM_FACTOR`. Unparsable values are logged and ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            low_factor: factor_from_env("TRAFFICWATCH_LOW_FACTOR", defaults.low_factor),
            high_factor: factor_from_env("TRAFFICWATCH_HIGH_FACTOR", defaults.high_factor),
            jam_factor: factor_from_env("TRAFFICWATCH_JAM_FACTOR", defaults.jam_factor),
        }
    }
}

fn factor_from_env(name: &str, default: f64) -> f64 {
    parse_factor(std::env::var(name).ok(), name, default)
}

fn parse_factor(raw: Option<String>, name: &str, default: f64) -> f64 {
    match raw {
        None => default,
        Some(value) => match value.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => parsed,
            _ => {
                tracing::warn!(%name, %value, "ignoring unparsable threshold override");
                default
            }
        },
    }
}
