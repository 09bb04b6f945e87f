// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};

/// Parse an RFC3339 timestamp into UTC.
pub fn parse_rfc3339(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse optional `before`/`after` request arguments.
///
/// Blank values count as absent. `before` earlier than `after` is rejected.
pub fn parse_date_range(
    before: Option<&str>,
    after: Option<&str>,
) -> Result<(Option<DateTime<Utc>>, Option<DateTime<Utc>>)> {
    let parse = |name: &str, value: Option<&str>| match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => parse_rfc3339(v).map(Some).ok_or_else(|| {
            AppError::BadRequest(format!(
                "Invalid '{}' date format. Use ISO 8601 format (e.g., 2024-01-15T00:00:00Z)",
                name
            ))
        }),
    };

    let before = parse("before", before)?;
    let after = parse("after", after)?;

    if let (Some(b), Some(a)) = (before, after) {
        if b < a {
            return Err(AppError::BadRequest(
                "'before' date must be after 'after' date".to_string(),
            ));
        }
    }

    Ok((before, after))
}
