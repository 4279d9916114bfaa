// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat endpoints: messaging, session listings, and history.

use serde::Deserialize;

use crate::error::Result;
use crate::models::{ChatGroup, ChatSession, Document, Message};
use crate::services::api::ApiClient;

/// Response body for `/chathistory/{chatId}`: the full detail of one chat.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatHistory {
    pub chat: ChatSession,
    pub messages: Vec<Message>,
    pub documents: Vec<Document>,
}

/// Typed wrappers over the chat endpoints.
#[derive(Clone)]
pub struct ChatService {
    api: ApiClient,
}

impl ChatService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Ask a question against the selected documents.
    ///
    /// An empty `document_ids` list is dispatched as-is; the backend
    /// decides what an unscoped query means. Returns the bot's reply.
    pub async fn send_message(
        &self,
        query: &str,
        chat_id: Option<&str>,
        document_ids: &[String],
    ) -> Result<Message> {
        tracing::debug!(
            chat_id = ?chat_id,
            documents = document_ids.len(),
            "Sending chat message"
        );

        let body = serde_json::json!({
            "query": query,
            "chat_id": chat_id,
            "document_ids": document_ids,
        });

        self.api.post_json("/chat", body).await.map_err(|e| {
            tracing::warn!(error = %e, "Chat message failed");
            e
        })
    }

    /// List the user's chat sessions.
    pub async fn list_chats(&self) -> Result<Vec<ChatSession>> {
        self.api.get_json("/chats").await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to fetch chats");
            e
        })
    }

    /// Fetch one chat's messages.
    pub async fn get_chat(&self, chat_id: &str) -> Result<Vec<Message>> {
        let path = format!("/chat/{}", urlencoding::encode(chat_id));
        self.api.get_json(&path).await.map_err(|e| {
            tracing::warn!(error = %e, chat = %chat_id, "Failed to fetch chat");
            e
        })
    }

    /// Fetch the full detail of one chat: the session record, its messages,
    /// and its documents.
    pub async fn get_chat_history(&self, chat_id: &str) -> Result<ChatHistory> {
        let path = format!("/chathistory/{}", urlencoding::encode(chat_id));
        self.api.get_json(&path).await.map_err(|e| {
            tracing::warn!(error = %e, chat = %chat_id, "Failed to fetch chat history");
            e
        })
    }

    /// List chat groupings.
    pub async fn list_chat_groups(&self) -> Result<Vec<ChatGroup>> {
        self.api.get_json("/chat_groups").await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to fetch chat groups");
            e
        })
    }
}
