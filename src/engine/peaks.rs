//! Peak-hour aggregation: the mode of the daily maxima.
//!
//! Two-stage reduction over a filtered record set: bucket vehicle counts by
//! `(calendar day, hour of day)`, take every tied maximum bucket as that
//! day's peak, then across days keep every hour with the top nomination
//! count. The reported value per winning hour is the floor of the mean of
//! the bucket sums that nominated it.

use chrono::{DateTime, NaiveDate, Timelike, Utc};
use serde::Serialize;
use std::collections::HashMap;

use crate::error::Result;
use crate::model::{CameraId, Measurement};
use crate::store::RecordStore;

use super::{shape_filter, TrafficEngine};

/// One winning hour-of-day bucket in a peak-hours report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeakHour {
    /// Display range for the hour, e.g. `"08:00 - 09:00"`; the upper edge
    /// wraps at midnight (`"23:00 - 00:00"`).
    pub hour_range: String,
    /// Floor of the mean vehicle count across the days that nominated
    /// this hour as their peak.
    pub vehicle_count: u64,
}

impl TrafficEngine {
    /// The hour(s) of day that most frequently carry the day's maximum
    /// vehicle volume within `[start, end]`, optionally filtered by camera
    /// or city.
    ///
    /// Ties at both stages are kept: a day with two equally busy hours
    /// nominates both, and every hour sharing the top nomination count
    /// appears in the result. An empty record set yields an empty vec.
    pub async fn peak_hours(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        camera_id: Option<CameraId>,
        city: Option<&str>,
    ) -> Result<Vec<PeakHour>> {
        let filter = shape_filter(camera_id, city, Some(start), Some(end));
        let records = self.store().query_measurements(&filter).await?;
        Ok(peak_hours_of(&records))
    }
}

/// Pure two-stage reduction; see the module docs.
pub(crate) fn peak_hours_of(records: &[Measurement]) -> Vec<PeakHour> {
    // Stage 1: sum vehicle counts into (day, hour) buckets keyed on the
    // measurement's start time.
    let mut buckets: HashMap<(NaiveDate, u32), u64> = HashMap::new();
    for m in records {
        let key = (m.start_time.date_naive(), m.start_time.hour());
        *buckets.entry(key).or_insert(0) += m.vehicle_count;
    }

    // Stage 2: every bucket tied for a day's maximum is that day's peak.
    let mut per_day: HashMap<NaiveDate, Vec<(u32, u64)>> = HashMap::new();
    for ((day, hour), vehicles) in buckets {
        per_day.entry(day).or_default().push((hour, vehicles));
    }
    let mut daily_peaks: Vec<(u32, u64)> = Vec::new();
    for entries in per_day.values() {
        let Some(max) = entries.iter().map(|&(_, v)| v).max() else {
            continue;
        };
        daily_peaks.extend(entries.iter().copied().filter(|&(_, v)| v == max));
    }
    if daily_peaks.is_empty() {
        return Vec::new();
    }

    // Stage 3: mode across days. Every hour at the top nomination count wins.
    let mut nominations: HashMap<u32, usize> = HashMap::new();
    for &(hour, _) in &daily_peaks {
        *nominations.entry(hour).or_insert(0) += 1;
    }
    let top = nominations.values().copied().max().unwrap_or(0);

    let mut winning_hours: Vec<u32> = nominations
        .iter()
        .filter(|&(_, &count)| count == top)
        .map(|(&hour, _)| hour)
        .collect();
    winning_hours.sort_unstable();

    winning_hours
        .into_iter()
        .map(|hour| {
            let counts: Vec<u64> = daily_peaks
                .iter()
                .filter(|&&(h, _)| h == hour)
                .map(|&(_, v)| v)
                .collect();
            // Floor of the mean, never rounded.
            let mean = counts.iter().sum::<u64>() as f64 / counts.len() as f64;
            PeakHour {
                hour_range: format_hour_range(hour),
                vehicle_count: mean.floor() as u64,
            }
        })
        .collect()
}

fn format_hour_range(hour: u32) -> String {
    format!("{:02}:00 - {:02}:00", hour, (hour + 1) % 24)
}
