// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - API client and typed endpoint wrappers.

pub mod api;
pub mod auth;
pub mod chat;
pub mod documents;

pub use api::{ApiClient, ApiRequest, Notice, Payload};
pub use auth::{AuthService, LoginResponse};
pub use chat::{ChatHistory, ChatService};
pub use documents::{DocumentService, UploadResponse};
