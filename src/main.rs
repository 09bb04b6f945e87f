// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Mirror API Server
//!
//! Serves cached Strava activities and reconciled sensor streams over HTTP,
//! backfilling from Strava on demand.

use std::sync::Arc;
use strava_mirror::{config::Config, logging::init_logging, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(std::io::stdout);

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(
        port = config.port,
        folder = %config.folder_path.display(),
        "Starting Strava-Mirror API"
    );

    let state = Arc::new(AppState::from_config(config.clone())?);
    let app = strava_mirror::routes::create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
