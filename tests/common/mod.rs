// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process mock backend for client integration tests.
//!
//! Serves the endpoints the client talks to, with scripted auth behavior:
//! a programmable number of 401s on protected endpoints, a gate that holds
//! `/auth/refresh` open until the test releases it, and a record of every
//! request seen.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::{json, Value};
use tokio::sync::{mpsc, Semaphore};

use pdfchat::config::ClientConfig;
use pdfchat::services::{ApiClient, Notice};

/// One multipart upload as the mock saw it.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct UploadSeen {
    pub file_name: Option<String>,
    pub bytes: usize,
    pub chat_id: Option<String>,
}

/// Scripted behavior plus a record of everything the backend served.
pub struct MockBackend {
    /// Protected endpoints serve this many 401s before succeeding.
    pub deny_next: AtomicUsize,
    /// When set, protected endpoints always 401.
    pub always_deny: AtomicBool,
    /// When set, `/auth/google` rejects with 401.
    pub fail_login: AtomicBool,
    /// When set, `/auth/refresh` rejects with 401.
    pub fail_refresh: AtomicBool,
    /// When set, `/auth/logout` fails with 500.
    pub fail_logout: AtomicBool,
    /// `/auth/refresh` blocks on this until the test adds a permit.
    pub refresh_gate: Semaphore,
    /// Times `/auth/refresh` was entered.
    pub refresh_calls: AtomicUsize,
    /// Protected request paths in the order they were served 200.
    pub served: Mutex<Vec<String>>,
    /// Protected request paths in the order they were rejected 401.
    pub denied: Mutex<Vec<String>>,
    /// Bodies posted to `/auth/google`.
    pub logins: Mutex<Vec<Value>>,
    /// Bodies posted to `/chat`.
    pub chat_bodies: Mutex<Vec<Value>>,
    /// Multipart uploads posted to `/upload_pdf`.
    pub uploads: Mutex<Vec<UploadSeen>>,
}

impl MockBackend {
    fn new(gated_refresh: bool) -> Self {
        let permits = if gated_refresh {
            0
        } else {
            Semaphore::MAX_PERMITS
        };
        Self {
            deny_next: AtomicUsize::new(0),
            always_deny: AtomicBool::new(false),
            fail_login: AtomicBool::new(false),
            fail_refresh: AtomicBool::new(false),
            fail_logout: AtomicBool::new(false),
            refresh_gate: Semaphore::new(permits),
            refresh_calls: AtomicUsize::new(0),
            served: Mutex::new(Vec::new()),
            denied: Mutex::new(Vec::new()),
            logins: Mutex::new(Vec::new()),
            chat_bodies: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    #[allow(dead_code)]
    pub fn served_paths(&self) -> Vec<String> {
        self.served.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn denied_count(&self) -> usize {
        self.denied.lock().unwrap().len()
    }

    #[allow(dead_code)]
    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    /// Let one parked `/auth/refresh` respond.
    #[allow(dead_code)]
    pub fn release_refresh(&self) {
        self.refresh_gate.add_permits(1);
    }
}

/// A running mock backend bound to an ephemeral local port.
pub struct TestServer {
    pub backend: Arc<MockBackend>,
    pub base_url: String,
}

/// Spawn the mock backend. With `gated_refresh` the `/auth/refresh`
/// handler parks until `release_refresh` is called, so tests control
/// exactly when a refresh settles.
#[allow(dead_code)]
pub async fn spawn_backend(gated_refresh: bool) -> TestServer {
    let backend = Arc::new(MockBackend::new(gated_refresh));
    let app = router(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock backend");
    let addr = listener.local_addr().expect("mock backend addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve mock backend");
    });

    TestServer {
        backend,
        base_url: format!("http://{}", addr),
    }
}

/// Client pointed at the mock backend.
#[allow(dead_code)]
pub fn test_client(
    server: &TestServer,
    refresh_queue_cap: usize,
) -> (ApiClient, mpsc::UnboundedReceiver<Notice>) {
    let config = ClientConfig {
        api_base: server.base_url.clone(),
        timeout_secs: 10,
        refresh_queue_cap,
    };
    ApiClient::new(&config).expect("build test client")
}

/// Encode a Google-style identity token for tests. The client never
/// verifies the signature, so any secret works.
#[allow(dead_code)]
pub fn make_credential(sub: &str, email: &str, name: &str) -> String {
    #[derive(serde::Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        email: &'a str,
        name: &'a str,
        picture: &'a str,
        exp: i64,
    }

    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &Claims {
            sub,
            email,
            name,
            picture: "https://example.com/avatar.png",
            exp: 4_000_000_000,
        },
        &jsonwebtoken::EncodingKey::from_secret(b"mock-secret"),
    )
    .expect("encode test credential")
}

/// Poll `cond` until it holds, panicking after two seconds.
#[allow(dead_code)]
pub async fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    for _ in 0..400 {
        if cond() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {}", what);
}

// ─── Routes ──────────────────────────────────────────────────────────────────

type Reject = (StatusCode, Json<Value>);

fn router(state: Arc<MockBackend>) -> Router {
    Router::new()
        .route("/auth/google", post(auth_google))
        .route("/auth/refresh", post(auth_refresh))
        .route("/auth/logout", post(auth_logout))
        .route("/get_collections", get(get_collections))
        .route("/upload_pdf", post(upload_pdf))
        .route("/user/documents", get(user_documents))
        .route("/chat", post(chat_send))
        .route("/chats", get(list_chats))
        .route("/chat/{chat_id}", get(get_chat))
        .route("/chat/{chat_id}/documents", get(chat_documents))
        .route("/chathistory/{chat_id}", get(chat_history))
        .route("/chat_groups", get(chat_groups))
        .with_state(state)
}

/// Serve or reject a protected request, recording which happened.
fn check_session(state: &MockBackend, path: &str) -> Result<(), Reject> {
    let deny = state.always_deny.load(Ordering::SeqCst)
        || state
            .deny_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();

    if deny {
        state.denied.lock().unwrap().push(path.to_string());
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Not authenticated"})),
        ));
    }

    state.served.lock().unwrap().push(path.to_string());
    Ok(())
}

async fn auth_google(
    State(state): State<Arc<MockBackend>>,
    jar: CookieJar,
    Json(body): Json<Value>,
) -> Result<(CookieJar, Json<Value>), Reject> {
    state.logins.lock().unwrap().push(body.clone());

    if state.fail_login.load(Ordering::SeqCst) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Invalid Google token"})),
        ));
    }

    let reply = json!({
        "message": "Login successful",
        "user": {
            "id": 7,
            "name": body["name"],
            "email": body["email"],
            "picture": body["picture"],
        }
    });
    Ok((jar.add(Cookie::new("session", "fresh")), Json(reply)))
}

async fn auth_refresh(
    State(state): State<Arc<MockBackend>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>), Reject> {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    let permit = state.refresh_gate.acquire().await.expect("refresh gate");
    permit.forget();

    if state.fail_refresh.load(Ordering::SeqCst) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Refresh token expired"})),
        ));
    }

    Ok((
        jar.add(Cookie::new("session", "fresh")),
        Json(json!({"message": "Token refreshed"})),
    ))
}

async fn auth_logout(State(state): State<Arc<MockBackend>>) -> Result<Json<Value>, Reject> {
    if state.fail_logout.load(Ordering::SeqCst) {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"detail": "Session backend unavailable"})),
        ));
    }
    Ok(Json(json!({"message": "Logged out"})))
}

async fn get_collections(State(state): State<Arc<MockBackend>>) -> Result<Json<Value>, Reject> {
    check_session(&state, "/get_collections")?;
    Ok(Json(json!(["default", "papers"])))
}

async fn upload_pdf(
    State(state): State<Arc<MockBackend>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, Reject> {
    check_session(&state, "/upload_pdf")?;

    let mut seen = UploadSeen {
        file_name: None,
        bytes: 0,
        chat_id: None,
    };
    while let Some(field) = multipart.next_field().await.expect("multipart field") {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("document") => {
                seen.file_name = field.file_name().map(str::to_string);
                seen.bytes = field.bytes().await.expect("document bytes").len();
            }
            Some("chat_id") => {
                seen.chat_id = Some(field.text().await.expect("chat_id text"));
            }
            _ => {}
        }
    }

    let chat_id = seen
        .chat_id
        .clone()
        .unwrap_or_else(|| "chat-new".to_string());
    let doc_id = format!("doc-{}", state.uploads.lock().unwrap().len() + 1);
    let reply = json!({
        "chat_id": chat_id,
        "document": {
            "id": doc_id,
            "filename": seen.file_name.clone().unwrap_or_default(),
            "title": null,
            "created_at": "2025-01-15T10:00:00Z",
        }
    });
    state.uploads.lock().unwrap().push(seen);
    Ok(Json(reply))
}

async fn user_documents(State(state): State<Arc<MockBackend>>) -> Result<Json<Value>, Reject> {
    check_session(&state, "/user/documents")?;
    Ok(Json(json!([
        {"id": "doc-1", "filename": "report.pdf", "title": "report", "created_at": "2025-01-10T09:00:00Z"},
        {"id": "doc-2", "filename": "notes.pdf", "title": null, "created_at": "2025-01-12T15:30:00Z"},
    ])))
}

async fn chat_send(
    State(state): State<Arc<MockBackend>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Reject> {
    check_session(&state, "/chat")?;
    state.chat_bodies.lock().unwrap().push(body.clone());

    let query = body["query"].as_str().unwrap_or_default();
    Ok(Json(json!({
        "id": 2,
        "content": format!("Answer about: {}", query),
        "sender": "bot",
        "timestamp": "2025-01-15T10:30:00Z",
    })))
}

async fn list_chats(State(state): State<Arc<MockBackend>>) -> Result<Json<Value>, Reject> {
    check_session(&state, "/chats")?;
    Ok(Json(json!([
        {"id": "chat-1", "title": "Quarterly report", "created_at": "2025-01-10T09:05:00Z"},
        {"id": "chat-2", "title": "Reading notes", "created_at": "2025-01-12T15:35:00Z"},
    ])))
}

async fn get_chat(
    State(state): State<Arc<MockBackend>>,
    Path(chat_id): Path<String>,
) -> Result<Json<Value>, Reject> {
    check_session(&state, &format!("/chat/{}", chat_id))?;
    Ok(Json(json!([
        {"id": 1, "content": "What does the report say?", "sender": "user", "timestamp": "2025-01-10T09:06:00Z"},
        {"id": 2, "content": "It says revenue grew.", "sender": "bot", "timestamp": "2025-01-10T09:06:05Z"},
    ])))
}

async fn chat_documents(
    State(state): State<Arc<MockBackend>>,
    Path(chat_id): Path<String>,
) -> Result<Json<Value>, Reject> {
    check_session(&state, &format!("/chat/{}/documents", chat_id))?;
    Ok(Json(json!([
        {"id": "doc-1", "filename": "report.pdf", "title": "report", "created_at": "2025-01-10T09:00:00Z"},
    ])))
}

async fn chat_history(
    State(state): State<Arc<MockBackend>>,
    Path(chat_id): Path<String>,
) -> Result<Json<Value>, Reject> {
    check_session(&state, &format!("/chathistory/{}", chat_id))?;
    Ok(Json(json!({
        "chat": {"id": chat_id, "title": "Quarterly report", "created_at": "2025-01-10T09:05:00Z"},
        "messages": [
            {"id": 1, "content": "What does the report say?", "sender": "user", "timestamp": "2025-01-10T09:06:00Z"},
            {"id": 2, "content": "It says revenue grew.", "sender": "bot", "timestamp": "2025-01-10T09:06:05Z"},
        ],
        "documents": [
            {"id": "doc-1", "filename": "report.pdf", "title": "report", "created_at": "2025-01-10T09:00:00Z"},
        ],
    })))
}

async fn chat_groups(State(state): State<Arc<MockBackend>>) -> Result<Json<Value>, Reject> {
    check_session(&state, "/chat_groups")?;
    Ok(Json(json!([
        {"id": "group-1", "title": "Finance", "created_at": "2025-01-09T08:00:00Z"},
    ])))
}
