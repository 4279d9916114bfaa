// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed storage for the signed-in user's profile.
//!
//! One JSON file under the platform data directory, read on startup and
//! removed on logout. Staleness is never checked locally; the backend
//! rejecting a request is what signals an expired session.

use std::fs;
use std::path::PathBuf;

use crate::error::{ApiError, Result};
use crate::models::UserProfile;

/// Filename under the application data directory.
const PROFILE_FILE: &str = "user_profile.json";

/// Persists the user profile across runs.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    /// Store rooted at the platform data directory
    /// (`<data-dir>/pdfchat/user_profile.json`).
    pub fn new() -> Result<Self> {
        let dir = dirs::data_dir()
            .ok_or_else(|| ApiError::ProfileStore("no platform data directory".to_string()))?
            .join("pdfchat");
        Ok(Self {
            path: dir.join(PROFILE_FILE),
        })
    }

    /// Store rooted at an explicit file path. Tests point this at a temp dir.
    pub fn at_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Serialize and write the profile, overwriting any existing entry.
    pub fn store(&self, profile: &UserProfile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ApiError::ProfileStore(format!("create {}: {}", parent.display(), e))
            })?;
        }

        let json = serde_json::to_string_pretty(profile)
            .map_err(|e| ApiError::ProfileStore(format!("serialize profile: {}", e)))?;
        fs::write(&self.path, json)
            .map_err(|e| ApiError::ProfileStore(format!("write {}: {}", self.path.display(), e)))?;

        tracing::debug!(path = %self.path.display(), "Stored user profile");
        Ok(())
    }

    /// The stored profile, or `None` when absent or unreadable.
    pub fn get(&self) -> Option<UserProfile> {
        let content = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&content) {
            Ok(profile) => Some(profile),
            Err(e) => {
                tracing::warn!(error = %e, "Stored profile is corrupt, treating as signed out");
                None
            }
        }
    }

    /// Remove the stored profile. Removing an absent entry is fine.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Cleared user profile");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ApiError::ProfileStore(format!(
                "remove {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
