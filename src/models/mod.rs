// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the client.

pub mod chat;
pub mod document;
pub mod user;

pub use chat::{ChatGroup, ChatSession, Message, Sender};
pub use document::Document;
pub use user::UserProfile;
