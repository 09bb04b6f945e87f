// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Credential lifecycle: lazy load, expiry check, refresh, persist.

use crate::db::CredentialStore;
use crate::error::{AppError, Result};
use crate::models::Credential;
use crate::services::StravaClient;
use chrono::Utc;
use tokio::sync::Mutex;

/// Owns the process's single live credential.
///
/// The credential is loaded from disk on first use and refreshed in-line
/// whenever it is found expired. The whole check/refresh/persist sequence
/// runs under one lock, so concurrent callers never refresh twice.
pub struct TokenManager {
    client: StravaClient,
    store: CredentialStore,
    held: Mutex<Held>,
}

#[derive(Default)]
struct Held {
    credential: Option<Credential>,
    /// Refreshed in memory but not yet written to the store
    unsaved: bool,
}

impl TokenManager {
    pub fn new(client: StravaClient, store: CredentialStore) -> Self {
        Self {
            client,
            store,
            held: Mutex::new(Held::default()),
        }
    }

    /// Return a non-expired credential, refreshing it if needed.
    ///
    /// A failed refresh leaves the held credential untouched, so the next
    /// call tries again. A refreshed credential replaces the held one before
    /// it is persisted; if persisting fails, every later call retries the
    /// write before handing the credential out.
    pub async fn get_valid_credential(&self) -> Result<Credential> {
        let mut held = self.held.lock().await;

        if held.credential.is_none() {
            let loaded = self.store.load().await?;
            tracing::info!(
                path = %self.store.path().display(),
                expires_at = loaded.expires_at,
                "Loaded credential"
            );
            held.credential = Some(loaded);
        }

        let Some(current) = held.credential.clone() else {
            return Err(AppError::Credential("No credential loaded".to_string()));
        };

        if !current.is_expired_at(Utc::now().timestamp()) {
            if held.unsaved {
                self.persist(&mut held, &current).await?;
            }
            return Ok(current);
        }

        tracing::info!(expires_at = current.expires_at, "Access token expired, refreshing");

        let refreshed = match self.client.refresh_token(&current.refresh_token).await {
            Ok(t) => t,
            Err(e) => {
                if e.is_token_error() {
                    tracing::warn!(error = %e, "Strava rejected the refresh token");
                }
                return Err(AppError::Credential(format!("Token refresh failed: {}", e)));
            }
        };

        let mut updated = current;
        updated.access_token = refreshed.access_token;
        updated.refresh_token = refreshed.refresh_token;
        updated.expires_at = refreshed.expires_at;
        if refreshed.expires_in.is_some() {
            updated.expires_in = refreshed.expires_in;
        }
        if refreshed.token_type.is_some() {
            updated.token_type = refreshed.token_type;
        }

        // Strava has already rotated the refresh token; never drop it.
        held.credential = Some(updated.clone());
        held.unsaved = true;
        self.persist(&mut held, &updated).await?;

        tracing::info!(expires_at = updated.expires_at, "Token refreshed and persisted");
        Ok(updated)
    }

    async fn persist(&self, held: &mut Held, credential: &Credential) -> Result<()> {
        if let Err(e) = self.store.save(credential).await {
            tracing::error!(error = %e, "Failed to persist refreshed credential");
            return Err(e);
        }
        held.unsaved = false;
        Ok(())
    }
}
