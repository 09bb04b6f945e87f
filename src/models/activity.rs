// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model, as returned by the API and stored in the cache.

use serde::{Deserialize, Serialize};

/// A summary activity from `GET /athlete/activities` or `GET /activities/{id}`.
///
/// Every metric is optional because Strava omits fields that do not apply
/// (no power meter, manual entry, etc.). Once cached, a record is never
/// overwritten.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Activity {
    /// Strava activity ID (also the cache key)
    pub id: u64,
    /// Activity name/title
    pub name: String,
    /// Legacy activity type (Ride, Run, Swim, ...)
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Finer-grained sport type (MountainBikeRide, TrailRun, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport_type: Option<String>,
    /// Start date/time (ISO 8601, UTC)
    pub start_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date_local: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    /// Distance in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
    /// Moving time in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moving_time: Option<u64>,
    /// Elapsed time in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<u64>,
    /// Total elevation gain in meters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_elevation_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elev_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elev_low: Option<f64>,

    /// Speeds in meters per second
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_cadence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weighted_average_watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_watts: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kilojoules: Option<f64>,

    pub has_heartrate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_heartrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_heartrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffer_score: Option<f64>,

    /// `[lat, lng]`; null or empty for indoor activities
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_latlng: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_latlng: Option<Vec<f64>>,

    pub trainer: bool,
    pub commute: bool,
    pub manual: bool,
    pub private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gear_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workout_type: Option<i64>,
}

impl Activity {
    /// Whether this is a bike activity, which carries power and cadence.
    pub fn is_ride(&self) -> bool {
        self.activity_type.eq_ignore_ascii_case("ride")
    }

    /// Parsed start date, or `None` when Strava sent something unparsable.
    pub fn start_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        crate::time_utils::parse_rfc3339(&self.start_date)
    }
}
