//! Congestion ratio: the share of measurements at or below a speed threshold.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::DEFAULT_SPEED_THRESHOLD;
use crate::error::Result;
use crate::model::{CameraId, Measurement};
use crate::store::RecordStore;

use super::{shape_filter, TrafficEngine};

/// Overall verdict of a congestion report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CongestionStatus {
    /// More than half of the matching records were at or below the threshold.
    #[serde(rename = "congested")]
    Congested,
    /// Half or fewer of the matching records were at or below the threshold.
    #[serde(rename = "fluid")]
    Fluid,
    /// No records matched the filter; the percentage is a sentinel zero.
    #[serde(rename = "no data")]
    NoData,
}

impl std::fmt::Display for CongestionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CongestionStatus::Congested => "congested",
            CongestionStatus::Fluid => "fluid",
            CongestionStatus::NoData => "no data",
        };
        f.write_str(label)
    }
}

/// Congestion summary for a filtered record set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CongestionReport {
    /// Share of matching records at or below the threshold, as a percentage
    /// rounded to two decimal places.
    pub percentage: f64,
    /// Verdict derived from the percentage.
    pub status: CongestionStatus,
}

impl TrafficEngine {
    /// Fraction of matching measurements at or below `threshold` km/h
    /// (default 10), as a percentage.
    ///
    /// An empty filtered set returns the `NoData` sentinel rather than
    /// dividing by zero; this is a result, not an error.
    pub async fn congestion(
        &self,
        camera_id: Option<CameraId>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        city: Option<&str>,
        threshold: Option<f64>,
    ) -> Result<CongestionReport> {
        let threshold = threshold.unwrap_or(DEFAULT_SPEED_THRESHOLD);
        let filter = shape_filter(camera_id, city, start, end);
        let records = self.store().query_measurements(&filter).await?;
        Ok(congestion_of(&records, threshold))
    }
}

/// Pure ratio computation over an already-filtered record set.
pub(crate) fn congestion_of(records: &[Measurement], threshold: f64) -> CongestionReport {
    let total = records.len();
    if total == 0 {
        return CongestionReport {
            percentage: 0.0,
            status: CongestionStatus::NoData,
        };
    }

    let low = records
        .iter()
        .filter(|m| m.average_speed <= threshold)
        .count();
    let percentage = round2(100.0 * low as f64 / total as f64);
    let status = if percentage > 50.0 {
        CongestionStatus::Congested
    } else {
        CongestionStatus::Fluid
    };
    CongestionReport { percentage, status }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn with_speeds(speeds: &[f64]) -> Vec<Measurement> {
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        speeds
            .iter()
            .enumerate()
            .map(|(i, &speed)| Measurement {
                id: i as i64,
                camera_id: 1,
                start_time: start,
                end_time: start + chrono::Duration::minutes(10),
                vehicle_count: 10,
                average_speed: speed,
            })
            .collect()
    }

    #[test]
    fn test_exactly_half_is_fluid() {
        // 2 of 4 at or below 10 km/h: 50% is not strictly above 50.
        let report = congestion_of(&with_speeds(&[5.0, 8.0, 15.0, 20.0]), 10.0);
        assert_eq!(report.percentage, 50.0);
        assert_eq!(report.status, CongestionStatus::Fluid);
    }

    #[test]
    fn test_majority_slow_is_congested() {
        let report = congestion_of(&with_speeds(&[5.0, 8.0, 9.0, 20.0]), 10.0);
        assert_eq!(report.percentage, 75.0);
        assert_eq!(report.status, CongestionStatus::Congested);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let report = congestion_of(&with_speeds(&[10.0]), 10.0);
        assert_eq!(report.percentage, 100.0);
        assert_eq!(report.status, CongestionStatus::Congested);
    }

    #[test]
    fn test_empty_set_returns_no_data_sentinel() {
        let report = congestion_of(&[], 10.0);
        assert_eq!(report.percentage, 0.0);
        assert_eq!(report.status, CongestionStatus::NoData);
    }

    #[test]
    fn test_percentage_rounds_to_two_decimals() {
        // 1 of 3: 33.333...% rounds to 33.33.
        let report = congestion_of(&with_speeds(&[5.0, 20.0, 20.0]), 10.0);
        assert_eq!(report.percentage, 33.33);
        // 2 of 3: 66.666...% rounds to 66.67.
        let report = congestion_of(&with_speeds(&[5.0, 5.0, 20.0]), 10.0);
        assert_eq!(report.percentage, 66.67);
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&CongestionStatus::NoData).unwrap(),
            "\"no data\""
        );
        let report = congestion_of(&with_speeds(&[5.0]), 10.0);
        assert_eq!(
            serde_json::to_string(&report).unwrap(),
            "{\"percentage\":100.0,\"status\":\"congested\"}"
        );
    }
}
