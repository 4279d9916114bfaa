// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types shared across services.

use serde::Deserialize;

/// Error type covering transport, auth, and backend failures.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Backend error (HTTP {status}): {message}")]
    Backend { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Session refresh failed: {0}")]
    RefreshFailed(String),

    #[error("Refresh queue full")]
    RefreshQueueFull,

    #[error("Profile store error: {0}")]
    ProfileStore(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    /// True for failures that mean the session is no longer valid and the
    /// user has to log in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ApiError::Unauthorized | ApiError::RefreshFailed(_))
    }

    /// Build a `Backend` error from a status code and response body.
    ///
    /// The backend wraps error messages as `{"detail": "..."}`; fall back to
    /// the raw body when the shape doesn't match.
    pub fn from_response(status: u16, body: &str) -> Self {
        #[derive(Deserialize)]
        struct Detail {
            detail: String,
        }

        let message = serde_json::from_str::<Detail>(body)
            .map(|d| d.detail)
            .unwrap_or_else(|_| body.to_string());

        ApiError::Backend { status, message }
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ApiError>;
