// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Merges an activity's raw stream channels into one aligned sample list.

use crate::db::{Codec, ZstdJsonCodec};
use crate::error::Result;
use crate::models::{Activity, ActivityStreams, ReconciledStream, StreamSample};
use crate::services::SyncEngine;
use tokio_util::sync::CancellationToken;

/// Serves the reconciled stream view, reading through the sync engine's cache.
pub struct StreamReconciler<C: Codec = ZstdJsonCodec> {
    engine: SyncEngine<C>,
}

impl<C: Codec + Clone> Clone for StreamReconciler<C> {
    fn clone(&self) -> Self {
        Self {
            engine: self.engine.clone(),
        }
    }
}

impl<C: Codec> StreamReconciler<C> {
    pub fn new(engine: SyncEngine<C>) -> Self {
        Self { engine }
    }

    /// Reconciled stream for one activity. Streams and metadata are read
    /// from the cache, fetched and cached on a miss.
    pub async fn get_reconciled_stream(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<ReconciledStream> {
        let credential = self.engine.tokens().get_valid_credential().await?;
        let access_token = credential.access_token.as_str();

        let lock = self.engine.lock_for(id);
        let _guard = lock.lock().await;

        let streams = self
            .engine
            .streams_cache_first(access_token, id, cancel)
            .await?;
        let activity = self
            .engine
            .activity_cache_first(access_token, id, cancel)
            .await?;

        let reconciled = reconcile(id, Some(&activity), &streams);
        tracing::debug!(
            id,
            is_ride = activity.is_ride(),
            samples = reconciled.streams.len(),
            "Reconciled stream"
        );
        Ok(reconciled)
    }
}

/// Align the channels of `streams` into per-index samples.
///
/// - Missing time, power or heart-rate channel: no samples at all.
/// - An index is kept only if it has both time and heart rate.
/// - Rides additionally need power, and cadence when a cadence channel
///   was recorded; their samples carry power and cadence.
/// - Everything else gets time and heart rate only.
pub fn reconcile(
    id: u64,
    activity: Option<&Activity>,
    streams: &ActivityStreams,
) -> ReconciledStream {
    let is_ride = activity.is_some_and(Activity::is_ride);

    let mut combined = ReconciledStream {
        activity_id: id.to_string(),
        activity_name: activity.map(|a| a.name.clone()).unwrap_or_default(),
        date: activity.map(|a| a.start_date.clone()).unwrap_or_default(),
        streams: Vec::new(),
    };

    let (Some(time), Some(watts), Some(heartrate)) =
        (&streams.time, &streams.watts, &streams.heartrate)
    else {
        return combined;
    };
    let cadence = streams.cadence.as_ref();

    for i in 0..time.data.len() {
        let (Some(t), Some(hr)) = (time.sample(i), heartrate.sample(i)) else {
            continue;
        };

        let mut sample = StreamSample {
            time: Some(t),
            heartrate: Some(hr),
            ..Default::default()
        };

        if is_ride {
            let power = watts.sample(i);
            let cad = cadence.and_then(|c| c.sample(i));
            if power.is_none() || (cadence.is_some() && cad.is_none()) {
                continue;
            }
            sample.watts = power;
            sample.cadence = cad;
        }

        combined.streams.push(sample);
    }

    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StreamChannel;

    fn activity(activity_type: &str) -> Activity {
        Activity {
            id: 9,
            name: "Evening Spin".to_string(),
            activity_type: activity_type.to_string(),
            start_date: "2024-02-10T18:00:00Z".to_string(),
            ..Default::default()
        }
    }

    fn full(values: &[f64]) -> StreamChannel {
        StreamChannel::new(values.iter().copied().map(Some).collect())
    }

    /// Five indices, power missing at index 2.
    fn five_index_streams() -> ActivityStreams {
        ActivityStreams {
            time: Some(full(&[0.0, 1.0, 2.0, 3.0, 4.0])),
            heartrate: Some(full(&[120.0, 121.0, 122.0, 123.0, 124.0])),
            watts: Some(StreamChannel::new(vec![
                Some(200.0),
                Some(210.0),
                None,
                Some(230.0),
                Some(240.0),
            ])),
            cadence: Some(full(&[85.0, 86.0, 87.0, 88.0, 89.0])),
        }
    }

    #[test]
    fn test_ride_drops_index_missing_power() {
        let result = reconcile(9, Some(&activity("Ride")), &five_index_streams());

        let times: Vec<f64> = result.streams.iter().filter_map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 1.0, 3.0, 4.0]);
        for s in &result.streams {
            assert!(s.heartrate.is_some());
            assert!(s.watts.is_some());
            assert!(s.cadence.is_some());
        }
        assert_eq!(result.activity_name, "Evening Spin");
        assert_eq!(result.date, "2024-02-10T18:00:00Z");
        assert_eq!(result.activity_id, "9");
    }

    #[test]
    fn test_non_ride_keeps_all_indices_without_power() {
        let result = reconcile(9, Some(&activity("Run")), &five_index_streams());

        assert_eq!(result.streams.len(), 5);
        for s in &result.streams {
            assert!(s.time.is_some());
            assert!(s.heartrate.is_some());
            assert_eq!(s.watts, None);
            assert_eq!(s.cadence, None);
        }
    }

    #[test]
    fn test_missing_power_channel_short_circuits() {
        let mut streams = five_index_streams();
        streams.watts = None;

        let result = reconcile(9, Some(&activity("Run")), &streams);
        assert!(result.streams.is_empty());
        assert_eq!(result.activity_name, "Evening Spin");
    }

    #[test]
    fn test_missing_heart_rate_sample_skips_index() {
        let mut streams = five_index_streams();
        streams.heartrate = Some(StreamChannel::new(vec![
            Some(120.0),
            None,
            Some(122.0),
            Some(123.0),
        ]));

        // Index 1 has no heart rate and index 4 is past the end of the channel.
        let result = reconcile(9, Some(&activity("Run")), &streams);
        let times: Vec<f64> = result.streams.iter().filter_map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 2.0, 3.0]);
    }

    #[test]
    fn test_ride_without_cadence_channel_keeps_power() {
        let mut streams = five_index_streams();
        streams.cadence = None;

        let result = reconcile(9, Some(&activity("ride")), &streams);
        assert_eq!(result.streams.len(), 4);
        assert!(result.streams.iter().all(|s| s.cadence.is_none()));
        assert!(result.streams.iter().all(|s| s.watts.is_some()));
    }

    #[test]
    fn test_unknown_activity_treated_as_non_ride() {
        let result = reconcile(9, None, &five_index_streams());
        assert_eq!(result.streams.len(), 5);
        assert!(result.activity_name.is_empty());
    }
}
