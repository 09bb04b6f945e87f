// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava-Mirror: a local, append-only mirror of one athlete's Strava data
//!
//! This crate keeps activities and their sensor streams cached on disk,
//! backfills incrementally from Strava, and serves reconciled views over
//! HTTP and over a JSON-RPC tool protocol on stdio.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod mcp;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{CredentialStore, LocalCache};
use error::Result;
use services::{StravaClient, StreamReconciler, SyncEngine, TokenManager};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub engine: SyncEngine,
    pub reconciler: StreamReconciler,
}

impl AppState {
    /// Wire up the client, credential store, cache and engine from config.
    pub fn from_config(config: Config) -> Result<Self> {
        let client = StravaClient::new(
            &config.strava_base_url,
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
            config.http_timeout,
        )?;

        let tokens = Arc::new(TokenManager::new(
            client.clone(),
            CredentialStore::new(config.credential_path()),
        ));
        let cache = LocalCache::new(&config.folder_path);
        let engine = SyncEngine::new(tokens, client, cache);
        let reconciler = StreamReconciler::new(engine.clone());

        Ok(Self {
            config,
            engine,
            reconciler,
        })
    }
}
