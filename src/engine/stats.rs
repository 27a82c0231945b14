//! Retrospective range reports: speed/volume stats and jam-event queries.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::filter::JamEventFilter;
use crate::model::{CameraId, JamEvent, Measurement};
use crate::store::RecordStore;

use super::{shape_filter, TrafficEngine};

/// Aggregate speed and volume figures over a time range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeStats {
    /// Mean average speed across matching records, `None` when there are none.
    pub average_speed: Option<f64>,
    /// Sum of vehicle counts across matching records.
    pub total_vehicles: u64,
}

impl TrafficEngine {
    /// Mean speed and total volume within `[start, end]`.
    pub async fn range_stats(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        camera_id: Option<CameraId>,
        city: Option<&str>,
    ) -> Result<RangeStats> {
        let filter = shape_filter(camera_id, city, Some(start), Some(end));
        let records = self.store().query_measurements(&filter).await?;

        let total_vehicles = records.iter().map(|m| m.vehicle_count).sum();
        let average_speed = if records.is_empty() {
            None
        } else {
            Some(records.iter().map(|m| m.average_speed).sum::<f64>() / records.len() as f64)
        };
        Ok(RangeStats {
            average_speed,
            total_vehicles,
        })
    }

    /// Total vehicle volume over an optional camera/time/city filter.
    /// An empty match sums to zero.
    pub async fn total_volume(
        &self,
        camera_id: Option<CameraId>,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        city: Option<&str>,
    ) -> Result<u64> {
        let filter = shape_filter(camera_id, city, start, end);
        let records = self.store().query_measurements(&filter).await?;
        Ok(records.iter().map(|m| m.vehicle_count).sum())
    }

    /// Raw measurements within `[start, end]`, optionally filtered.
    pub async fn measurements(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        camera_id: Option<CameraId>,
        city: Option<&str>,
    ) -> Result<Vec<Measurement>> {
        let filter = shape_filter(camera_id, city, Some(start), Some(end));
        Ok(self.store().query_measurements(&filter).await?)
    }

    /// Jam events whose trigger time falls within `[start, end]`.
    pub async fn jam_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        camera_id: Option<CameraId>,
        city: Option<&str>,
    ) -> Result<Vec<JamEvent>> {
        let mut filter = JamEventFilter::new().between(start, end);
        if let Some(id) = camera_id {
            filter = filter.camera(id);
        }
        if let Some(city) = city {
            filter = filter.city(city);
        }
        Ok(self.store().query_jam_events(&filter).await?)
    }
}
