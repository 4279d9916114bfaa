// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! pdfchat: chat with uploaded PDF documents over a hosted QA backend.
//!
//! This crate provides the client side: an authenticated API client with
//! transparent session refresh, typed endpoint wrappers, local profile
//! storage, and the session state a front end renders.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod store;
pub mod time_utils;

use config::ClientConfig;
use services::{ApiClient, AuthService, ChatService, DocumentService, Notice};
use store::ProfileStore;
use tokio::sync::mpsc;

/// The wired-up client: every service sharing one API client.
pub struct App {
    pub auth: AuthService,
    pub documents: DocumentService,
    pub chat: ChatService,
    /// User-facing notices emitted outside direct call results
    /// (session expiry and the like).
    pub notices: mpsc::UnboundedReceiver<Notice>,
}

impl App {
    /// Wire all services against one API client and the platform profile
    /// store.
    pub fn new(config: &ClientConfig) -> error::Result<Self> {
        let (api, notices) = ApiClient::new(config)?;
        let store = ProfileStore::new()?;

        Ok(Self {
            auth: AuthService::new(api.clone(), store),
            documents: DocumentService::new(api.clone()),
            chat: ChatService::new(api),
            notices,
        })
    }
}
