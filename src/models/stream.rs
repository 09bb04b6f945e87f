// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Sensor stream channels and the reconciled view served to consumers.

use serde::{Deserialize, Serialize};

/// Channel keys requested from the streams endpoint.
pub const STREAM_KEYS: [&str; 4] = ["watts", "time", "heartrate", "cadence"];

/// One named sensor series; samples are index-aligned with sibling channels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamChannel {
    pub data: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
}

impl StreamChannel {
    pub fn new(data: Vec<Option<f64>>) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    /// Sample at `index`; out-of-range counts as missing.
    pub fn sample(&self, index: usize) -> Option<f64> {
        self.data.get(index).copied().flatten()
    }
}

/// The channel set for one activity (`key_by_type=true` response shape).
///
/// A `None` channel means Strava did not record it at all, which is
/// different from a channel with missing samples.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityStreams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watts: Option<StreamChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<StreamChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartrate: Option<StreamChannel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<StreamChannel>,
}

/// Merged, filtered view of one activity's streams. Never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledStream {
    pub activity_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub activity_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub date: String,
    pub streams: Vec<StreamSample>,
}

/// One aligned sample. Power and cadence are only populated for rides.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamSample {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watts: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heartrate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cadence: Option<f64>,
}
