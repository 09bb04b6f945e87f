// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! OAuth credential persisted between runs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The account's OAuth credential.
///
/// Written first by the bootstrap tool (which also stores the athlete
/// profile) and rewritten in place on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry, Unix seconds
    pub expires_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// Athlete profile from the authorization-code exchange, kept verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub athlete: Option<Value>,
    /// Fields we don't model (e.g. `scope`), written back unchanged
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credential {
    /// Expired when `expires_at` is at or before `now`.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}
