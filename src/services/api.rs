// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Backend API client with transparent session refresh.
//!
//! Handles:
//! - Cookie-based authenticated requests against a shared base URL
//! - Single-flight session refresh on 401 with FIFO request queuing
//! - Multipart PDF uploads
//! - Session-expired notices for the front end

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::multipart;
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, oneshot};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};

/// Body of a replayable request.
#[derive(Debug, Clone)]
pub enum Payload {
    None,
    Json(serde_json::Value),
    /// Multipart PDF upload. The form is consumed by the send that carries
    /// it, so the raw parts stay here and the form is rebuilt per attempt.
    PdfUpload {
        file_name: String,
        bytes: Vec<u8>,
        chat_id: Option<String>,
    },
}

/// A request descriptor that can be rebuilt and replayed after a refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: reqwest::Method,
    pub path: String,
    pub payload: Payload,
    /// Set before replay. A retried request never triggers a second refresh.
    pub retried: bool,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: reqwest::Method::GET,
            path: path.into(),
            payload: Payload::None,
            retried: false,
        }
    }

    pub fn post_json(path: impl Into<String>, body: serde_json::Value) -> Self {
        Self {
            method: reqwest::Method::POST,
            path: path.into(),
            payload: Payload::Json(body),
            retried: false,
        }
    }

    pub fn post_pdf(
        path: impl Into<String>,
        file_name: impl Into<String>,
        bytes: Vec<u8>,
        chat_id: Option<String>,
    ) -> Self {
        Self {
            method: reqwest::Method::POST,
            path: path.into(),
            payload: Payload::PdfUpload {
                file_name: file_name.into(),
                bytes,
                chat_id,
            },
            retried: false,
        }
    }

    fn mark_retried(mut self) -> Self {
        self.retried = true;
        self
    }
}

/// User-facing notification emitted outside a direct call result.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The session could not be refreshed; the user has to log in again.
    SessionExpired(String),
}

/// Refresh bookkeeping shared by all clones of a client.
///
/// The mutex is only ever held for synchronous queue updates, never across
/// an await, so a 401 observed mid-refresh always either joins the queue or
/// starts the one refresh.
struct RefreshState {
    refreshing: bool,
    /// Parked requests in arrival order, the one that started the refresh
    /// at the front. `Ok` means replay, `Err` carries the refresh error.
    waiters: VecDeque<oneshot::Sender<std::result::Result<(), String>>>,
}

/// Backend API client.
///
/// Cheap to clone; clones share the cookie store and refresh state. The
/// session credential lives in cookies managed by the underlying client,
/// never in request bodies or headers built here.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    refresh: Arc<Mutex<RefreshState>>,
    queue_cap: usize,
    notices: mpsc::UnboundedSender<Notice>,
}

impl ApiClient {
    /// Create a client from config.
    ///
    /// Returns the client plus the receiver for user-facing notices.
    pub fn new(config: &ClientConfig) -> Result<(Self, mpsc::UnboundedReceiver<Notice>)> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .cookie_store(true)
            .build()?;

        let (notices, notice_rx) = mpsc::unbounded_channel();

        let client = Self {
            http,
            base_url: config.api_base.trim_end_matches('/').to_string(),
            refresh: Arc::new(Mutex::new(RefreshState {
                refreshing: false,
                waiters: VecDeque::new(),
            })),
            queue_cap: config.refresh_queue_cap,
            notices,
        };

        Ok((client, notice_rx))
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of requests currently parked behind an in-flight refresh,
    /// the one that triggered it included.
    pub fn parked_requests(&self) -> usize {
        let state = self.refresh.lock().unwrap_or_else(|e| e.into_inner());
        state.waiters.len()
    }

    // ─── Request Execution ───────────────────────────────────────────────────

    /// Issue a request, transparently refreshing the session on 401.
    ///
    /// Any status other than 401 is returned unchanged for the caller to
    /// interpret. A 401 on a not-yet-retried request enters the refresh
    /// protocol; a 401 on a retried request fails outright.
    pub async fn execute(&self, request: ApiRequest) -> Result<reqwest::Response> {
        let response = self.send_once(&request).await?;

        if response.status() != reqwest::StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        if request.retried {
            tracing::warn!(path = %request.path, "Replay rejected again, giving up");
            return Err(ApiError::Unauthorized);
        }

        tracing::debug!(path = %request.path, "Got 401, entering refresh protocol");
        self.refresh_and_replay(request).await
    }

    /// GET a JSON endpoint with refresh handling.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.execute(ApiRequest::get(path)).await?;
        self.check_response_json(response).await
    }

    /// POST a JSON body with refresh handling and parse the JSON reply.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<T> {
        let response = self.execute(ApiRequest::post_json(path, body)).await?;
        self.check_response_json(response).await
    }

    /// Build and send one transport attempt for a descriptor.
    async fn send_once(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self.http.request(request.method.clone(), &url);

        builder = match &request.payload {
            Payload::None => builder,
            Payload::Json(body) => builder.json(body),
            Payload::PdfUpload {
                file_name,
                bytes,
                chat_id,
            } => {
                let part = multipart::Part::bytes(bytes.clone())
                    .file_name(file_name.clone())
                    .mime_str("application/pdf")?;
                let mut form = multipart::Form::new().part("document", part);
                if let Some(chat_id) = chat_id {
                    form = form.text("chat_id", chat_id.clone());
                }
                builder.multipart(form)
            }
        };

        Ok(builder.send().await?)
    }

    // ─── Refresh Protocol ────────────────────────────────────────────────────

    /// 401 recovery: join or start the single-flight refresh, then replay.
    async fn refresh_and_replay(&self, request: ApiRequest) -> Result<reqwest::Response> {
        let (tx, rx) = oneshot::channel();

        // Decide leader vs. follower with the lock held; no awaiting here.
        let start_refresh = {
            let mut state = self.refresh.lock().unwrap_or_else(|e| e.into_inner());
            if state.refreshing {
                if state.waiters.len() >= self.queue_cap {
                    tracing::warn!(
                        cap = self.queue_cap,
                        path = %request.path,
                        "Refresh queue full, rejecting request"
                    );
                    return Err(ApiError::RefreshQueueFull);
                }
                state.waiters.push_back(tx);
                false
            } else {
                state.refreshing = true;
                state.waiters.push_back(tx);
                true
            }
        };

        if start_refresh {
            self.spawn_refresh();
        }

        match rx.await {
            Ok(Ok(())) => {
                let replay = request.mark_retried();
                let response = self.send_once(&replay).await?;
                if response.status() == reqwest::StatusCode::UNAUTHORIZED {
                    tracing::warn!(path = %replay.path, "Replay rejected after refresh");
                    return Err(ApiError::Unauthorized);
                }
                Ok(response)
            }
            Ok(Err(message)) => Err(ApiError::RefreshFailed(message)),
            // The refresh task settles every sender before dropping them, so a
            // closed channel means that task died mid-flight.
            Err(_) => Err(ApiError::Internal(anyhow::anyhow!(
                "refresh task dropped before settling parked requests"
            ))),
        }
    }

    /// Run the refresh call in a detached task so a caller dropping its
    /// future cannot strand parked requests.
    fn spawn_refresh(&self) {
        let client = self.clone();
        tokio::spawn(async move {
            let outcome = client.call_refresh_endpoint().await;
            client.settle_refresh(outcome);
        });
    }

    /// POST /auth/refresh through the raw transport. The refresh call itself
    /// must never re-enter the 401 protocol.
    async fn call_refresh_endpoint(&self) -> Result<()> {
        let url = format!("{}/auth/refresh", self.base_url);
        let response = self.http.post(&url).send().await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("Session refreshed");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "Session refresh rejected");
        Err(ApiError::from_response(status.as_u16(), &body))
    }

    /// Clear the refreshing flag and wake every parked request in FIFO order.
    fn settle_refresh(&self, outcome: Result<()>) {
        let failure = outcome.err().map(|e| e.to_string());

        let waiters = {
            let mut state = self.refresh.lock().unwrap_or_else(|e| e.into_inner());
            state.refreshing = false;
            std::mem::take(&mut state.waiters)
        };

        match &failure {
            Some(message) => {
                tracing::warn!(
                    parked = waiters.len(),
                    error = %message,
                    "Refresh failed, rejecting parked requests"
                );
                let _ = self
                    .notices
                    .send(Notice::SessionExpired(message.clone()));
            }
            None => {
                tracing::debug!(parked = waiters.len(), "Refresh settled, replaying parked requests");
            }
        }

        for tx in waiters {
            let result = match &failure {
                None => Ok(()),
                Some(message) => Err(message.clone()),
            };
            // A waiter may have been dropped by its caller; that is its loss.
            let _ = tx.send(result);
        }
    }

    // ─── Response Checking ───────────────────────────────────────────────────

    /// Check response status, mapping error statuses to `ApiError`.
    pub async fn check_response(&self, response: reqwest::Response) -> Result<()> {
        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::from_response(status, &body))
    }

    /// Check response status and parse the JSON body.
    pub async fn check_response_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_response(status, &body));
        }

        Ok(response.json().await?)
    }
}
