// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Structured JSON logging setup shared by both binaries.

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured JSON logging to `writer`.
///
/// `RUST_LOG` is honoured; crate debug logs and everything else at info are
/// on by default. The stdio tool binary must pass `std::io::stderr`, since
/// stdout carries protocol frames.
pub fn init_logging<W>(writer: W)
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(writer);

    let mut filter = EnvFilter::from_default_env();
    for directive in ["strava_mirror=debug", "info"] {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }

    tracing_subscriber::registry().with(filter).with(format).init();
}
