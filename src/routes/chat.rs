// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat routes: history, live events, text, attachments and voice notes.
//!
//! The peer is addressed by uid in the path; the room is always derived
//! server-side from the authenticated user and the peer.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Extension, Json, Router,
};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::ChatMessage;
use crate::routes::{bad_multipart, missing_field, read_media_field};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/chat/{peer}/messages", get(messages).post(send_text))
        .route("/api/chat/{peer}/events", get(events))
        .route("/api/chat/{peer}/files", post(send_file))
        .route("/api/chat/{peer}/voice/start", post(voice_start))
        .route("/api/chat/{peer}/voice/chunks", post(voice_chunk))
        .route("/api/chat/{peer}/voice/stop", post(voice_stop))
}

/// Conversation history, most recent message first.
async fn messages(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(peer): Path<String>,
) -> Result<Json<Vec<ChatMessage>>> {
    Ok(Json(state.chat.messages(&user, &peer).await?))
}

/// Live message stream over SSE.
///
/// Each `messages` event carries the full ordered snapshot: one on
/// connect, then one after every append to the room. Disconnecting drops
/// the subscription.
async fn events(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(peer): Path<String>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let (room_id, receiver) = state.chat.watch(&user, &peer)?;
    let chat = state.chat.clone();

    let stream = stream::unfold(
        (chat, room_id, receiver, true),
        |(chat, room_id, mut receiver, first)| async move {
            if !first {
                loop {
                    match receiver.recv().await {
                        Ok(()) => break,
                        // Missed ticks collapse into one re-read
                        Err(broadcast::error::RecvError::Lagged(_)) => break,
                        Err(broadcast::error::RecvError::Closed) => return None,
                    }
                }
            }

            let event = match chat.room_messages(&room_id).await {
                Ok(snapshot) => Event::default()
                    .event("messages")
                    .json_data(&snapshot)
                    .unwrap_or_else(|_| Event::default().event("error")),
                Err(e) => {
                    tracing::warn!(error = %e, room_id = %room_id, "Chat snapshot read failed");
                    Event::default().event("error")
                }
            };

            Some((Ok(event), (chat, room_id, receiver, false)))
        },
    );

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

#[derive(Deserialize)]
struct SendTextRequest {
    text: String,
}

/// Append a text message.
async fn send_text(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(peer): Path<String>,
    Json(req): Json<SendTextRequest>,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    let message = state.chat.send_text(&user, &peer, &req.text).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Upload an attachment and append its message. Multipart form with one
/// `file` part.
async fn send_file(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(peer): Path<String>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ChatMessage>)> {
    let mut file = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name().unwrap_or("") == "file" {
            file = Some(read_media_field(field).await?);
        }
    }
    let file = file.ok_or_else(|| missing_field("file"))?;

    let message = state.chat.send_file(&user, &peer, file).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

// ─── Voice notes ───

/// Begin a voice capture. Any capture already open for this conversation
/// is discarded.
async fn voice_start(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(peer): Path<String>,
) -> Result<StatusCode> {
    state.chat.start_voice(&user, &peer)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Append raw audio bytes to the active capture.
async fn voice_chunk(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(peer): Path<String>,
    body: Bytes,
) -> Result<StatusCode> {
    state.chat.push_voice_chunk(&user, &peer, &body)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Finish the capture. Returns the appended voice message, or `null` when
/// nothing was recorded.
async fn voice_stop(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(peer): Path<String>,
) -> Result<Json<Option<ChatMessage>>> {
    Ok(Json(state.chat.stop_voice(&user, &peer).await?))
}
