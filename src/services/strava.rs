// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Paginated activity listing (and full backfill since a cutoff)
//! - Single activity fetch
//! - Sensor stream fetch
//! - Token refresh
//!
//! No call is retried; every failure goes straight back to the caller.

use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityStreams};
use crate::services::cancellable;
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Page size for `GET /athlete/activities` (Strava's maximum).
pub const ACTIVITIES_PER_PAGE: u32 = 200;

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a client for the Strava host at `base_url` (no trailing slash).
    pub fn new(
        base_url: &str,
        client_id: String,
        client_secret: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client setup failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id,
            client_secret,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v3{}", self.base_url, path)
    }

    /// One page of the athlete's activities started after `after` (Unix seconds).
    pub async fn list_activities_page(
        &self,
        access_token: &str,
        after: i64,
        page: u32,
    ) -> Result<Vec<Activity>> {
        let response = self
            .http
            .get(self.api_url("/athlete/activities"))
            .bearer_auth(access_token)
            .query(&[
                ("page", page.to_string()),
                ("per_page", ACTIVITIES_PER_PAGE.to_string()),
                ("after", after.to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Every activity started after `after`, walking pages from 1 until an
    /// empty page comes back.
    ///
    /// A failure on any page discards the pages already fetched.
    pub async fn get_all_activities_since(
        &self,
        access_token: &str,
        after: i64,
        cancel: &CancellationToken,
    ) -> Result<Vec<Activity>> {
        let mut all_activities = Vec::new();
        let mut page = 1;

        loop {
            let activities = cancellable(cancel, self.list_activities_page(access_token, after, page))
                .await
                .map_err(|e| match e {
                    AppError::Transport(msg) => {
                        AppError::Transport(format!("fetching page {}: {}", page, msg))
                    }
                    other => other,
                })?;

            if activities.is_empty() {
                break;
            }

            tracing::debug!(page, count = activities.len(), "Fetched activity page");
            all_activities.extend(activities);
            page += 1;
        }

        Ok(all_activities)
    }

    /// Get a single activity by ID.
    pub async fn get_activity(&self, access_token: &str, activity_id: u64) -> Result<Activity> {
        let url = self.api_url(&format!("/activities/{}", activity_id));
        self.get_json(&url, access_token, &[]).await
    }

    /// Fetch the requested stream channels for an activity, keyed by type.
    pub async fn fetch_streams(
        &self,
        access_token: &str,
        activity_id: u64,
        keys: &[&str],
    ) -> Result<ActivityStreams> {
        let url = self.api_url(&format!("/activities/{}/streams", activity_id));
        let keys = keys.join(",");
        self.get_json(
            &url,
            access_token,
            &[("keys", keys.as_str()), ("key_by_type", "true")],
        )
        .await
    }

    /// Exchange a refresh token for a new access token.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenRefreshResponse> {
        let response = self
            .http
            .post(format!("{}/oauth/token", self.base_url))
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Check response status and parse the JSON body.
    async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
            } else if status.as_u16() == 401 {
                tracing::warn!("Strava rejected the access token (401)");
            }

            return Err(AppError::Transport(format!("HTTP {}: {}", status, body)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(format!("Failed to read response body: {}", e)))?;

        serde_json::from_slice(&body)
            .map_err(|e| AppError::Decode(format!("JSON parse error: {}", e)))
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub token_type: Option<String>,
}
