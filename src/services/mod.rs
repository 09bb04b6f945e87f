// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod reconcile;
pub mod strava;
pub mod sync;
pub mod token;

pub use reconcile::StreamReconciler;
pub use strava::StravaClient;
pub use sync::{SyncEngine, SyncSummary};
pub use token::TokenManager;

use crate::error::{AppError, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Run `fut` unless `cancel` fires first.
///
/// Checked before starting, so an already-cancelled token never issues the call.
pub async fn cancellable<T, F>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        result = fut => result,
    }
}
