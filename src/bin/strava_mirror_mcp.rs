// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Mirror tool server
//!
//! Reads newline-delimited JSON-RPC requests on stdin and writes one
//! response line per request on stdout. Logs go to stderr.

use std::sync::Arc;
use strava_mirror::{config::Config, logging::init_logging, mcp::McpServer, AppState};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(std::io::stderr);

    let config = Config::from_env()?;
    let state = Arc::new(AppState::from_config(config)?);
    let server = McpServer::new(state);
    tracing::info!("Tool server ready on stdio");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        tracing::debug!(request = %line, "Received");

        let Some(response) = server.handle_line(&line).await else {
            continue;
        };

        let mut out = match serde_json::to_vec(&response) {
            Ok(out) => out,
            Err(e) => {
                tracing::error!(error = %e, "Response marshal error");
                continue;
            }
        };
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
