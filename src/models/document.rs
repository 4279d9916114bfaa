// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Uploaded document model.

use serde::{Deserialize, Serialize};

/// An uploaded PDF document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    /// Display title, usually the filename without its extension
    #[serde(default)]
    pub title: Option<String>,
    /// ISO 8601
    pub created_at: String,
}

impl Document {
    /// Title if set, falling back to the raw filename.
    pub fn display_name(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.filename)
    }
}
