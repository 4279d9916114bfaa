// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Document endpoints: collections, uploads, and listings.

use serde::Deserialize;

use crate::error::Result;
use crate::models::Document;
use crate::services::api::{ApiClient, ApiRequest};

/// Response body for `/upload_pdf`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// Chat the document landed in. Uploads without a bound chat create a
    /// new one and report its id here.
    pub chat_id: String,
    pub document: Document,
}

/// Typed wrappers over the document endpoints.
#[derive(Clone)]
pub struct DocumentService {
    api: ApiClient,
}

impl DocumentService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// List legacy collection names.
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.api.get_json("/get_collections").await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to fetch collections");
            e
        })
    }

    /// Upload a PDF, optionally bound to an existing chat.
    ///
    /// With no `chat_id` the backend creates a fresh chat; the response
    /// carries its id for the caller to adopt.
    pub async fn upload_pdf(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        chat_id: Option<&str>,
    ) -> Result<UploadResponse> {
        tracing::debug!(
            file = %file_name,
            size = bytes.len(),
            chat_id = ?chat_id,
            "Uploading PDF"
        );

        let request =
            ApiRequest::post_pdf("/upload_pdf", file_name, bytes, chat_id.map(String::from));
        let response = self.api.execute(request).await.map_err(|e| {
            tracing::warn!(error = %e, file = %file_name, "PDF upload failed");
            e
        })?;
        let upload: UploadResponse = self.api.check_response_json(response).await.map_err(|e| {
            tracing::warn!(error = %e, file = %file_name, "PDF upload rejected");
            e
        })?;

        tracing::info!(document = %upload.document.id, chat = %upload.chat_id, "PDF uploaded");
        Ok(upload)
    }

    /// List documents owned by the current user.
    pub async fn list_user_documents(&self) -> Result<Vec<Document>> {
        self.api.get_json("/user/documents").await.map_err(|e| {
            tracing::warn!(error = %e, "Failed to fetch user documents");
            e
        })
    }

    /// List documents attached to a chat.
    pub async fn list_chat_documents(&self, chat_id: &str) -> Result<Vec<Document>> {
        let path = format!("/chat/{}/documents", urlencoding::encode(chat_id));
        self.api.get_json(&path).await.map_err(|e| {
            tracing::warn!(error = %e, chat = %chat_id, "Failed to fetch chat documents");
            e
        })
    }
}
