// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Current time as RFC3339 with a `Z` suffix.
///
/// Used to stamp locally composed messages before the backend echoes them.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a backend timestamp for terminal display ("Jan 15 14:30", UTC).
///
/// The backend emits both timezone-aware and naive ISO 8601 strings.
/// Unparseable input is returned unchanged.
pub fn format_timestamp(ts: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return dt.with_timezone(&Utc).format("%b %e %H:%M").to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.format("%b %e %H:%M").to_string();
    }
    ts.to_string()
}
