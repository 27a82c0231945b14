//! Shared filter shaping for range and filter queries.
//!
//! Every reporting operation narrows its record set the same way: optional
//! camera-id equality, optional city equality (resolved against the camera),
//! then an optional time range. Filters are conjunctive; an absent field
//! means "no constraint", never "match nothing".

use chrono::{DateTime, Utc};

use crate::model::{CameraId, JamEvent, Measurement};

/// Conjunctive filter over stored measurements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementFilter {
    /// Match only this camera.
    pub camera_id: Option<CameraId>,
    /// Match only cameras installed in this city.
    pub city: Option<String>,
    /// Lower bound on the measurement's start time (inclusive).
    pub start: Option<DateTime<Utc>>,
    /// Upper bound on the measurement's end time (inclusive).
    pub end: Option<DateTime<Utc>>,
}

impl MeasurementFilter {
    /// An unconstrained filter matching every measurement.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one camera.
    pub fn camera(mut self, id: CameraId) -> Self {
        self.camera_id = Some(id);
        self
    }

    /// Restrict to cameras in a city.
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Keep measurements starting at or after `start`.
    pub fn since(mut self, start: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self
    }

    /// Keep measurements ending at or before `end`.
    pub fn until(mut self, end: DateTime<Utc>) -> Self {
        self.end = Some(end);
        self
    }

    /// Keep measurements whose window lies within `[start, end]`.
    pub fn between(self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.since(start).until(end)
    }

    /// Apply the filter to one measurement.
    ///
    /// `camera_city` is the city of the measurement's camera, if known;
    /// a city constraint never matches a camera whose city is unknown.
    /// Constraints apply in fixed order: camera, city, start bound, end bound.
    pub fn matches(&self, m: &Measurement, camera_city: Option<&str>) -> bool {
        if let Some(id) = self.camera_id {
            if m.camera_id != id {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if camera_city != Some(city.as_str()) {
                return false;
            }
        }
        if let Some(start) = self.start {
            if m.start_time < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if m.end_time > end {
                return false;
            }
        }
        true
    }
}

/// Conjunctive filter over jam events, keyed on `event_time`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JamEventFilter {
    /// Match only this camera.
    pub camera_id: Option<CameraId>,
    /// Match only cameras installed in this city.
    pub city: Option<String>,
    /// Lower bound on the event time (inclusive).
    pub start: Option<DateTime<Utc>>,
    /// Upper bound on the event time (inclusive).
    pub end: Option<DateTime<Utc>>,
}

impl JamEventFilter {
    /// An unconstrained filter matching every jam event.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one camera.
    pub fn camera(mut self, id: CameraId) -> Self {
        self.camera_id = Some(id);
        self
    }

    /// Restrict to cameras in a city.
    pub fn city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    /// Keep events inside `[start, end]`.
    pub fn between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Apply the filter to one jam event.
    pub fn matches(&self, event: &JamEvent, camera_city: Option<&str>) -> bool {
        if let Some(id) = self.camera_id {
            if event.camera_id != id {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if camera_city != Some(city.as_str()) {
                return false;
            }
        }
        if let Some(start) = self.start {
            if event.event_time < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if event.event_time > end {
                return false;
            }
        }
        true
    }
}
