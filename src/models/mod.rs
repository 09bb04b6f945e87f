// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod credential;
pub mod stream;

pub use activity::Activity;
pub use credential::Credential;
pub use stream::{ActivityStreams, ReconciledStream, StreamChannel, StreamSample, STREAM_KEYS};
