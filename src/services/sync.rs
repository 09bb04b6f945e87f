// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Incremental backfill from Strava into the local cache.
//!
//! Handles the core workflow:
//! 1. Get a valid credential
//! 2. Fetch every activity since the cutoff
//! 3. Cache each activity not already cached
//! 4. Fetch and cache streams for each activity that has none yet
//!
//! Any failure aborts the run. Whatever was cached before the failure stays
//! cached, so re-running resumes where the last run stopped.

use crate::db::{Codec, LocalCache, ZstdJsonCodec};
use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityStreams, STREAM_KEYS};
use crate::services::{cancellable, StravaClient, TokenManager};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Default look-back for reads that do not specify `after`.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Look-back for an explicit refresh request.
pub const REFRESH_LOOKBACK_DAYS: i64 = 365;

/// Per-activity locks around check-then-fetch-then-save.
///
/// Entries are never removed, so the map grows with the number of distinct
/// activity ids seen by the process (bounded by the athlete's history).
pub type ActivityLocks = Arc<DashMap<u64, Arc<Mutex<()>>>>;

/// Counts from one backfill run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncSummary {
    /// Activities returned by Strava for the cutoff
    pub fetched: usize,
    /// Activity records newly written to the cache
    pub new_activities: usize,
    /// Stream records newly written to the cache
    pub new_streams: usize,
}

/// Orchestrates backfill and cache-first reads.
pub struct SyncEngine<C: Codec = ZstdJsonCodec> {
    tokens: Arc<TokenManager>,
    client: StravaClient,
    cache: LocalCache<C>,
    locks: ActivityLocks,
}

impl<C: Codec + Clone> Clone for SyncEngine<C> {
    fn clone(&self) -> Self {
        Self {
            tokens: self.tokens.clone(),
            client: self.client.clone(),
            cache: self.cache.clone(),
            locks: self.locks.clone(),
        }
    }
}

impl<C: Codec> SyncEngine<C> {
    pub fn new(tokens: Arc<TokenManager>, client: StravaClient, cache: LocalCache<C>) -> Self {
        Self {
            tokens,
            client,
            cache,
            locks: Arc::new(DashMap::new()),
        }
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    pub fn cache(&self) -> &LocalCache<C> {
        &self.cache
    }

    /// Backfill every activity started at or after `cutoff`.
    pub async fn process_activities(
        &self,
        cutoff: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<SyncSummary> {
        let credential = self.tokens.get_valid_credential().await?;
        let access_token = credential.access_token.as_str();

        let activities = self
            .client
            .get_all_activities_since(access_token, cutoff.timestamp(), cancel)
            .await?;

        tracing::info!(
            cutoff = %cutoff,
            count = activities.len(),
            "Fetched activities for backfill"
        );

        let mut summary = SyncSummary {
            fetched: activities.len(),
            ..Default::default()
        };

        for activity in &activities {
            if cancel.is_cancelled() {
                tracing::info!(?summary, "Backfill cancelled");
                return Err(AppError::Cancelled);
            }

            let lock = self.lock_for(activity.id);
            let _guard = lock.lock().await;

            if self.cache.get_activity(activity.id).await?.is_none() {
                self.cache.save_activity(activity).await?;
                summary.new_activities += 1;
            }

            if self.cache.get_streams(activity.id).await?.is_some() {
                continue;
            }

            tracing::info!(
                id = activity.id,
                start_date = %activity.start_date,
                "Getting stream for activity"
            );
            let streams = cancellable(
                cancel,
                self.client
                    .fetch_streams(access_token, activity.id, &STREAM_KEYS),
            )
            .await?;
            self.cache.save_streams(activity.id, &streams).await?;
            summary.new_streams += 1;
        }

        tracing::info!(
            fetched = summary.fetched,
            new_activities = summary.new_activities,
            new_streams = summary.new_streams,
            "Backfill complete"
        );
        Ok(summary)
    }

    /// Backfill the last year; what an explicit "refresh" maps to.
    pub async fn refresh(&self, cancel: &CancellationToken) -> Result<SyncSummary> {
        self.process_activities(Utc::now() - Duration::days(REFRESH_LOOKBACK_DAYS), cancel)
            .await
    }

    /// All cached activities, newest first, after an opportunistic backfill.
    ///
    /// `type_filter` EXCLUDES activities whose type matches it
    /// (case-insensitive); an empty filter keeps everything. Activities with
    /// unparsable start dates are dropped, as are those outside the
    /// `after`/`before` bounds.
    pub async fn get_all_activities(
        &self,
        type_filter: &str,
        before: Option<DateTime<Utc>>,
        after: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Activity>> {
        let cutoff = after.unwrap_or_else(|| Utc::now() - Duration::days(DEFAULT_LOOKBACK_DAYS));
        self.process_activities(cutoff, cancel).await?;

        let mut activities = self.cache.list_activities().await?;
        sort_newest_first(&mut activities);

        Ok(activities
            .into_iter()
            .filter(|a| keep_activity(a, type_filter, before, after))
            .collect())
    }

    // ─── Cache-first access (shared with StreamReconciler) ───────

    pub(crate) fn lock_for(&self, id: u64) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Cached streams for `id`, fetching and caching them on a miss.
    /// Caller must hold `lock_for(id)`.
    pub(crate) async fn streams_cache_first(
        &self,
        access_token: &str,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<ActivityStreams> {
        if let Some(streams) = self.cache.get_streams(id).await? {
            return Ok(streams);
        }

        tracing::info!(id, "Stream not cached, fetching");
        let streams = cancellable(
            cancel,
            self.client.fetch_streams(access_token, id, &STREAM_KEYS),
        )
        .await?;
        self.cache.save_streams(id, &streams).await?;
        Ok(streams)
    }

    /// Cached activity for `id`, fetching and caching it on a miss.
    /// Caller must hold `lock_for(id)`.
    pub(crate) async fn activity_cache_first(
        &self,
        access_token: &str,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<Activity> {
        if let Some(activity) = self.cache.get_activity(id).await? {
            return Ok(activity);
        }

        tracing::info!(id, "Activity not cached, fetching");
        let activity = cancellable(cancel, self.client.get_activity(access_token, id)).await?;
        self.cache.save_activity(&activity).await?;
        Ok(activity)
    }
}

/// Descending by start date string; fixed-width ISO 8601 sorts chronologically.
fn sort_newest_first(activities: &mut [Activity]) {
    activities.sort_by(|a, b| b.start_date.cmp(&a.start_date));
}

fn keep_activity(
    activity: &Activity,
    type_filter: &str,
    before: Option<DateTime<Utc>>,
    after: Option<DateTime<Utc>>,
) -> bool {
    if !type_filter.is_empty() && activity.activity_type.eq_ignore_ascii_case(type_filter) {
        return false;
    }

    let Some(start) = activity.start_time() else {
        return false;
    };

    if after.is_some_and(|after| start < after) {
        return false;
    }

    !before.is_some_and(|before| start > before)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_utils::parse_rfc3339;

    fn activity(id: u64, activity_type: &str, start_date: &str) -> Activity {
        Activity {
            id,
            activity_type: activity_type.to_string(),
            start_date: start_date.to_string(),
            ..Default::default()
        }
    }

    fn dt(s: &str) -> Option<DateTime<Utc>> {
        parse_rfc3339(s)
    }

    #[test]
    fn test_sort_newest_first() {
        let mut activities = vec![
            activity(1, "Run", "2024-01-01T00:00:00Z"),
            activity(2, "Run", "2024-03-15T00:00:00Z"),
            activity(3, "Run", "2024-02-10T00:00:00Z"),
        ];
        sort_newest_first(&mut activities);
        let ids: Vec<u64> = activities.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_type_filter_excludes_matches() {
        let ride = activity(1, "Ride", "2024-01-01T00:00:00Z");
        let run = activity(2, "Run", "2024-01-01T00:00:00Z");

        assert!(!keep_activity(&ride, "ride", None, None));
        assert!(keep_activity(&run, "ride", None, None));
        assert!(keep_activity(&ride, "", None, None));
    }

    #[test]
    fn test_unparsable_date_dropped() {
        let bad = activity(1, "Run", "yesterday");
        assert!(!keep_activity(&bad, "", None, None));
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let a = activity(1, "Run", "2024-02-01T00:00:00Z");
        let after = dt("2024-02-01T00:00:00Z");
        let before = dt("2024-02-01T00:00:00Z");
        assert!(keep_activity(&a, "", before, after));

        assert!(!keep_activity(&a, "", None, dt("2024-02-01T00:00:01Z")));
        assert!(!keep_activity(&a, "", dt("2024-01-31T23:59:59Z"), None));
    }
}
