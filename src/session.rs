// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory state for the chat front end.
//!
//! Holds the append-only message log, the current chat id, and the
//! selected document set. All I/O stays in the service layer; this module
//! only records what the user and the backend said.

use crate::models::{Message, Sender};
use crate::time_utils;

/// Reply shown in place of the bot's answer when a send fails.
pub const SEND_ERROR_REPLY: &str =
    "Sorry, I encountered an error processing your request. Please try again.";

/// State of the current chat session.
#[derive(Debug, Default)]
pub struct ChatState {
    /// None until a chat exists; the first upload adopts the id the
    /// backend assigns.
    chat_id: Option<String>,
    messages: Vec<Message>,
    selected: Vec<String>,
}

impl ChatState {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Chat Identity ───────────────────────────────────────────────────────

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    /// Adopt a chat id reported by the backend (upload into a new chat).
    pub fn adopt_chat(&mut self, chat_id: impl Into<String>) {
        let chat_id = chat_id.into();
        tracing::debug!(chat = %chat_id, "Adopted chat id");
        self.chat_id = Some(chat_id);
    }

    /// Switch to a fetched chat, replacing the log wholesale and dropping
    /// the previous document selection.
    pub fn open_chat(&mut self, chat_id: impl Into<String>, messages: Vec<Message>) {
        self.chat_id = Some(chat_id.into());
        self.messages = messages;
        self.selected.clear();
    }

    /// Back to a fresh, not-yet-created chat.
    pub fn reset(&mut self) {
        self.chat_id = None;
        self.messages.clear();
        self.selected.clear();
    }

    // ─── Message Log ─────────────────────────────────────────────────────────

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Append a locally composed user message, stamped with the current
    /// time, and return its id.
    pub fn push_user_message(&mut self, content: impl Into<String>) -> i64 {
        let id = self.next_id();
        self.messages.push(Message {
            id,
            content: content.into(),
            sender: Sender::User,
            timestamp: Some(time_utils::now_rfc3339()),
        });
        id
    }

    /// Append the bot's reply as the backend returned it.
    pub fn push_reply(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append a bot-styled error line; the log stays usable after a
    /// failed send.
    pub fn push_error_reply(&mut self) {
        let id = self.next_id();
        self.messages.push(Message {
            id,
            content: SEND_ERROR_REPLY.to_string(),
            sender: Sender::Bot,
            timestamp: Some(time_utils::now_rfc3339()),
        });
    }

    fn next_id(&self) -> i64 {
        self.messages.len() as i64 + 1
    }

    // ─── Document Selection ──────────────────────────────────────────────────

    pub fn selected_documents(&self) -> &[String] {
        &self.selected
    }

    /// Toggle one document in or out of the selection. Returns true when
    /// the document is selected afterwards.
    pub fn toggle_selection(&mut self, document_id: &str) -> bool {
        if let Some(pos) = self.selected.iter().position(|id| id == document_id) {
            self.selected.remove(pos);
            false
        } else {
            self.selected.push(document_id.to_string());
            true
        }
    }

    /// Replace the selection outright (select-all, clear).
    pub fn set_selection(&mut self, document_ids: Vec<String>) {
        self.selected = document_ids;
    }
}
