// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity API routes.
//!
//! Every handler gets its own cancellation token, cancelled when the handler
//! future is dropped (client gone), so an abandoned backfill stops at the
//! next page or activity.

use crate::error::{AppError, Result};
use crate::models::{Activity, ReconciledStream};
use crate::services::SyncSummary;
use crate::time_utils::parse_date_range;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/activities", get(get_activities))
        .route("/api/activities/refresh", get(refresh_activities))
        .route("/api/activities/stream/{id}", get(get_activity_stream))
        .route("/api/activities/{filter}", get(get_filtered_activities))
}

// ─── Refresh ─────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RefreshResponse {
    pub status: String,
    #[serde(flatten)]
    pub summary: SyncSummary,
}

/// Backfill the last year from Strava.
async fn refresh_activities(State(state): State<Arc<AppState>>) -> Result<Json<RefreshResponse>> {
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let summary = state.engine.refresh(&cancel).await?;
    Ok(Json(RefreshResponse {
        status: "refreshed".to_string(),
        summary,
    }))
}

// ─── Activities ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ActivitiesQuery {
    /// Only activities at or before this time (RFC 3339)
    before: Option<String>,
    /// Only activities at or after this time (RFC 3339)
    after: Option<String>,
}

async fn get_activities(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Json<Vec<Activity>>> {
    list_activities(&state, "", &query).await
}

/// Same as `/api/activities`, but drops activities of type `filter`.
async fn get_filtered_activities(
    State(state): State<Arc<AppState>>,
    Path(filter): Path<String>,
    Query(query): Query<ActivitiesQuery>,
) -> Result<Json<Vec<Activity>>> {
    list_activities(&state, &filter, &query).await
}

async fn list_activities(
    state: &AppState,
    filter: &str,
    query: &ActivitiesQuery,
) -> Result<Json<Vec<Activity>>> {
    let (before, after) = parse_date_range(query.before.as_deref(), query.after.as_deref())?;

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let activities = state
        .engine
        .get_all_activities(filter, before, after, &cancel)
        .await?;
    Ok(Json(activities))
}

// ─── Streams ─────────────────────────────────────────────────

async fn get_activity_stream(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ReconciledStream>> {
    let id: u64 = id
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid activity id: {}", id)))?;

    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    let stream = state.reconciler.get_reconciled_stream(id, &cancel).await?;
    Ok(Json(stream))
}
