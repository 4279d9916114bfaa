// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! pdfchat terminal client
//!
//! A line-oriented shell over the chat services: sign in with a Google
//! identity token, upload PDFs, pick the documents to ask about, and
//! talk to the backend's question-answering service.

use std::io::Write;
use std::path::Path;

use pdfchat::config::ClientConfig;
use pdfchat::models::{Message, Sender};
use pdfchat::services::Notice;
use pdfchat::session::{ChatState, SEND_ERROR_REPLY};
use pdfchat::time_utils;
use pdfchat::App;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = ClientConfig::from_env().expect("Failed to load configuration");
    tracing::info!(api_base = %config.api_base, "Starting pdfchat");

    let mut app = App::new(&config).expect("Failed to initialize services");
    let mut state = ChatState::new();

    match app.auth.current_user() {
        Some(profile) => println!("Signed in as {} <{}>", profile.name, profile.email),
        None => println!("Not signed in. Use `login <identity-token>` to start."),
    }
    println!("Type `help` for commands.");

    loop {
        drain_notices(&mut app);

        print!("pdfchat> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.splitn(2, ' ');
        let command = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("").trim();

        match command {
            "help" => print_help(),
            "quit" | "exit" => break,
            "login" => cmd_login(&app, rest).await,
            "logout" => cmd_logout(&app).await,
            "whoami" => cmd_whoami(&app),
            "upload" => cmd_upload(&app, &mut state, rest).await,
            "docs" => cmd_docs(&app, &state).await,
            "select" => cmd_select(&app, &mut state, rest).await,
            "chats" => cmd_chats(&app).await,
            "open" => cmd_open(&app, &mut state, rest).await,
            "history" => cmd_history(&app, &state).await,
            "groups" => cmd_groups(&app).await,
            "collections" => cmd_collections(&app).await,
            "new" => {
                state.reset();
                println!("Started a new chat.");
            }
            "say" => cmd_say(&app, &mut state, rest).await,
            _ => println!("Unknown command `{}`. Type `help` for commands.", command),
        }
    }

    println!("Bye.");
    Ok(())
}

/// Print any queued notices (session expiry and the like).
fn drain_notices(app: &mut App) {
    while let Ok(notice) = app.notices.try_recv() {
        match notice {
            Notice::SessionExpired(message) => {
                println!("! Session expired, please log in again ({})", message);
            }
        }
    }
}

async fn cmd_login(app: &App, credential: &str) {
    if credential.is_empty() {
        println!("Usage: login <identity-token>");
        return;
    }

    match app.auth.login(credential).await {
        Ok(profile) => println!("Signed in as {} <{}>", profile.name, profile.email),
        Err(e) => println!("Login failed: {}", e),
    }
}

async fn cmd_logout(app: &App) {
    match app.auth.logout().await {
        Ok(()) => println!("Signed out."),
        Err(e) => println!("Signed out locally; the server call failed: {}", e),
    }
}

fn cmd_whoami(app: &App) {
    match app.auth.current_user() {
        Some(profile) => {
            println!("{} <{}>", profile.name, profile.email);
            if let Some(picture) = &profile.picture {
                println!("picture: {}", picture);
            }
        }
        None => println!("Not signed in."),
    }
}

async fn cmd_upload(app: &App, state: &mut ChatState, path: &str) {
    if path.is_empty() {
        println!("Usage: upload <path-to-pdf>");
        return;
    }

    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            println!("Cannot read {}: {}", path, e);
            return;
        }
    };
    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    // Bind to the open chat; with none open the backend creates one.
    let bound_chat = state.chat_id().map(String::from);
    let result = app
        .documents
        .upload_pdf(&file_name, bytes, bound_chat.as_deref())
        .await;

    match result {
        Ok(upload) => {
            if bound_chat.is_none() {
                state.adopt_chat(upload.chat_id.clone());
            }
            println!(
                "Uploaded {} to chat {}",
                upload.document.display_name(),
                upload.chat_id
            );
        }
        Err(e) => println!("Upload failed: {}", e),
    }
}

async fn cmd_docs(app: &App, state: &ChatState) {
    let result = match state.chat_id() {
        Some(chat_id) => app.documents.list_chat_documents(chat_id).await,
        None => app.documents.list_user_documents().await,
    };

    match result {
        Ok(docs) if docs.is_empty() => println!("No documents yet. `upload <path>` to add one."),
        Ok(docs) => {
            for doc in &docs {
                let marker = if state.selected_documents().contains(&doc.id) {
                    "x"
                } else {
                    " "
                };
                println!(
                    "[{}] {}  {}  ({})",
                    marker,
                    doc.id,
                    doc.display_name(),
                    time_utils::format_timestamp(&doc.created_at)
                );
            }
        }
        Err(e) => println!("Could not list documents: {}", e),
    }
}

async fn cmd_select(app: &App, state: &mut ChatState, what: &str) {
    match what {
        "" => println!("Usage: select <document-id> | all | none"),
        "none" => {
            state.set_selection(Vec::new());
            println!("Selection cleared.");
        }
        "all" => {
            let result = match state.chat_id() {
                Some(chat_id) => app.documents.list_chat_documents(chat_id).await,
                None => app.documents.list_user_documents().await,
            };
            match result {
                Ok(docs) => {
                    let ids: Vec<String> = docs.into_iter().map(|d| d.id).collect();
                    println!("Selected {} document(s).", ids.len());
                    state.set_selection(ids);
                }
                Err(e) => println!("Could not list documents: {}", e),
            }
        }
        id => {
            if state.toggle_selection(id) {
                println!("Selected {}.", id);
            } else {
                println!("Deselected {}.", id);
            }
        }
    }
}

async fn cmd_chats(app: &App) {
    match app.chat.list_chats().await {
        Ok(chats) if chats.is_empty() => println!("No chats yet."),
        Ok(chats) => {
            for chat in &chats {
                println!(
                    "{}  {}  ({})",
                    chat.id,
                    chat.title,
                    time_utils::format_timestamp(&chat.created_at)
                );
            }
        }
        Err(e) => println!("Could not list chats: {}", e),
    }
}

async fn cmd_open(app: &App, state: &mut ChatState, chat_id: &str) {
    if chat_id.is_empty() {
        println!("Usage: open <chat-id>");
        return;
    }

    match app.chat.get_chat(chat_id).await {
        Ok(messages) => {
            state.open_chat(chat_id, messages);
            println!("Opened chat {}.", chat_id);
            print_messages(state.messages());
        }
        Err(e) => println!("Could not open chat: {}", e),
    }
}

async fn cmd_history(app: &App, state: &ChatState) {
    let chat_id = match state.chat_id() {
        Some(id) => id,
        None => {
            println!("No chat open. `open <chat-id>` first.");
            return;
        }
    };

    match app.chat.get_chat_history(chat_id).await {
        Ok(history) => {
            println!(
                "{} (created {})",
                history.chat.title,
                time_utils::format_timestamp(&history.chat.created_at)
            );
            if !history.documents.is_empty() {
                println!("Documents:");
                for doc in &history.documents {
                    println!("  {}  {}", doc.id, doc.display_name());
                }
            }
            print_messages(&history.messages);
        }
        Err(e) => println!("Could not fetch history: {}", e),
    }
}

async fn cmd_groups(app: &App) {
    match app.chat.list_chat_groups().await {
        Ok(groups) if groups.is_empty() => println!("No chat groups."),
        Ok(groups) => {
            for group in &groups {
                println!(
                    "{}  {}  ({})",
                    group.id,
                    group.title.as_deref().unwrap_or("(untitled)"),
                    time_utils::format_timestamp(&group.created_at)
                );
            }
        }
        Err(e) => println!("Could not list chat groups: {}", e),
    }
}

async fn cmd_collections(app: &App) {
    match app.documents.list_collections().await {
        Ok(names) if names.is_empty() => println!("No collections."),
        Ok(names) => {
            for name in &names {
                println!("{}", name);
            }
        }
        Err(e) => println!("Could not list collections: {}", e),
    }
}

async fn cmd_say(app: &App, state: &mut ChatState, text: &str) {
    if text.is_empty() {
        println!("Usage: say <message>");
        return;
    }

    state.push_user_message(text);

    let chat_id = state.chat_id().map(String::from);
    let result = app
        .chat
        .send_message(text, chat_id.as_deref(), state.selected_documents())
        .await;

    match result {
        Ok(reply) => {
            println!("bot: {}", reply.content);
            state.push_reply(reply);
        }
        Err(e) => {
            if e.is_auth_error() {
                println!("! {}", e);
            }
            state.push_error_reply();
            println!("bot: {}", SEND_ERROR_REPLY);
        }
    }
}

fn print_messages(messages: &[Message]) {
    for message in messages {
        let who = match message.sender {
            Sender::User => "you",
            Sender::Bot => "bot",
        };
        match &message.timestamp {
            Some(ts) => println!(
                "[{}] {}: {}",
                time_utils::format_timestamp(ts),
                who,
                message.content
            ),
            None => println!("{}: {}", who, message.content),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  login <identity-token>   sign in with a Google credential");
    println!("  logout                   end the session");
    println!("  whoami                   show the stored profile");
    println!("  upload <path>            upload a PDF into the current chat");
    println!("  docs                     list documents (current chat, or all of yours)");
    println!("  select <id>|all|none     choose documents to ask about");
    println!("  chats                    list chat sessions");
    println!("  open <chat-id>           switch to a chat");
    println!("  history                  full detail of the open chat");
    println!("  groups                   list chat groupings");
    println!("  collections              list stored collections");
    println!("  new                      start a fresh chat");
    println!("  say <message>            ask a question");
    println!("  quit                     leave");
}

/// Initialize logging to stderr so chat output on stdout stays clean.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pdfchat=info".parse().unwrap())
                .add_directive("warn".parse().unwrap()),
        )
        .with(format)
        .init();
}
