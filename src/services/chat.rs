// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Two-party chat: text, file attachments, voice notes, live updates.
//!
//! The directory store is the source of truth. Live delivery is an in-process
//! notification hub: every append fires a tick to the room's subscribers, who
//! re-read the full ordered snapshot. Voice notes are captured chunk by chunk
//! into a server-side buffer and become a message when the capture stops.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::broadcast;

use crate::db::Db;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::chat::room_id_for;
use crate::models::{ChatMessage, MessageKind};
use crate::services::media::{sanitize_file_name, MediaStore, MediaUpload};
use crate::time_utils::format_utc_rfc3339;

/// Buffered notifications per room subscriber. Receivers that fall behind
/// re-read the snapshot anyway, so a small buffer is enough.
const CHANNEL_CAPACITY: usize = 16;

/// Upper bound on a buffered voice note.
const MAX_VOICE_BYTES: usize = 10 * 1024 * 1024;

/// Chat service.
#[derive(Clone)]
pub struct ChatService {
    db: Db,
    media: MediaStore,
    /// Change notifiers keyed by room, shared across requests within this
    /// instance.
    hub: Arc<DashMap<String, broadcast::Sender<()>>>,
    /// In-flight voice captures keyed by `(room, sender uid)`.
    captures: Arc<DashMap<(String, String), Vec<u8>>>,
}

impl ChatService {
    pub fn new(db: Db, media: MediaStore) -> Self {
        Self {
            db,
            media,
            hub: Arc::new(DashMap::new()),
            captures: Arc::new(DashMap::new()),
        }
    }

    /// Current conversation with `peer`, most recent message first.
    pub async fn messages(
        &self,
        ctx: &AuthUser,
        peer: &str,
    ) -> Result<Vec<ChatMessage>, AppError> {
        let room_id = self.room_for(ctx, peer)?;
        self.db.messages_for_room(&room_id).await
    }

    /// Subscribe to change notifications for the conversation with `peer`.
    ///
    /// Returns the room ID and a receiver that fires after every append made
    /// through this service. The caller re-reads the snapshot on each tick;
    /// dropping the receiver unsubscribes.
    pub fn watch(
        &self,
        ctx: &AuthUser,
        peer: &str,
    ) -> Result<(String, broadcast::Receiver<()>), AppError> {
        let room_id = self.room_for(ctx, peer)?;
        let sender = self
            .hub
            .entry(room_id.clone())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone();
        Ok((room_id, sender.subscribe()))
    }

    /// Current ordered snapshot for a room (used by the event stream).
    pub(crate) async fn room_messages(&self, room_id: &str) -> Result<Vec<ChatMessage>, AppError> {
        self.db.messages_for_room(room_id).await
    }

    /// Append a text message.
    pub async fn send_text(
        &self,
        ctx: &AuthUser,
        peer: &str,
        text: &str,
    ) -> Result<ChatMessage, AppError> {
        let room_id = self.room_for(ctx, peer)?;

        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Message text is required".to_string()));
        }

        let message = ChatMessage {
            message_id: uuid::Uuid::new_v4().simple().to_string(),
            room_id: room_id.clone(),
            sender_id: ctx.uid.clone(),
            timestamp: format_utc_rfc3339(Utc::now()),
            kind: MessageKind::Text,
            text: Some(text.to_string()),
            file_url: None,
            file_name: None,
            voice_url: None,
        };
        self.db.upsert_message(&message).await?;

        self.notify(&room_id);
        Ok(message)
    }

    /// Upload an attachment and append the message pointing at it.
    ///
    /// The upload happens first, so a storage failure appends nothing.
    pub async fn send_file(
        &self,
        ctx: &AuthUser,
        peer: &str,
        file: MediaUpload,
    ) -> Result<ChatMessage, AppError> {
        let room_id = self.room_for(ctx, peer)?;

        if file.data.is_empty() {
            return Err(AppError::Validation("Attachment is empty".to_string()));
        }

        let display_name = if file.file_name.is_empty() {
            "file".to_string()
        } else {
            file.file_name.clone()
        };
        let object = format!(
            "chatFiles/{}/{}_{}",
            room_id,
            Utc::now().timestamp_millis(),
            sanitize_file_name(&file.file_name)
        );
        let url = self
            .media
            .upload(&object, file.data, &file.content_type)
            .await?;

        let message = ChatMessage {
            message_id: uuid::Uuid::new_v4().simple().to_string(),
            room_id: room_id.clone(),
            sender_id: ctx.uid.clone(),
            timestamp: format_utc_rfc3339(Utc::now()),
            kind: MessageKind::File,
            text: None,
            file_url: Some(url),
            file_name: Some(display_name),
            voice_url: None,
        };
        self.db.upsert_message(&message).await?;

        self.notify(&room_id);
        Ok(message)
    }

    /// Begin a voice capture. An existing capture for the same
    /// `(room, sender)` is discarded.
    pub fn start_voice(&self, ctx: &AuthUser, peer: &str) -> Result<(), AppError> {
        let room_id = self.room_for(ctx, peer)?;
        self.captures.insert((room_id, ctx.uid.clone()), Vec::new());
        Ok(())
    }

    /// Append audio bytes to the active capture.
    pub fn push_voice_chunk(
        &self,
        ctx: &AuthUser,
        peer: &str,
        chunk: &[u8],
    ) -> Result<(), AppError> {
        let room_id = self.room_for(ctx, peer)?;
        let key = (room_id, ctx.uid.clone());

        let Some(mut capture) = self.captures.get_mut(&key) else {
            return Err(AppError::Precondition(
                "No voice capture in progress".to_string(),
            ));
        };
        if capture.len() + chunk.len() > MAX_VOICE_BYTES {
            drop(capture);
            self.captures.remove(&key);
            return Err(AppError::Validation("Voice note is too large".to_string()));
        }
        capture.extend_from_slice(chunk);

        Ok(())
    }

    /// Finish the active capture, upload it and append the voice message.
    ///
    /// Stopping without an active capture is a no-op, and an empty capture
    /// is discarded; both return `None`.
    pub async fn stop_voice(
        &self,
        ctx: &AuthUser,
        peer: &str,
    ) -> Result<Option<ChatMessage>, AppError> {
        let room_id = self.room_for(ctx, peer)?;

        let Some((_, data)) = self.captures.remove(&(room_id.clone(), ctx.uid.clone())) else {
            return Ok(None);
        };
        if data.is_empty() {
            return Ok(None);
        }

        let object = format!("chatVoices/{}/{}.m4a", room_id, Utc::now().timestamp_millis());
        let url = self.media.upload(&object, data, "audio/mp4").await?;

        let message = ChatMessage {
            message_id: uuid::Uuid::new_v4().simple().to_string(),
            room_id: room_id.clone(),
            sender_id: ctx.uid.clone(),
            timestamp: format_utc_rfc3339(Utc::now()),
            kind: MessageKind::Voice,
            text: None,
            file_url: None,
            file_name: None,
            voice_url: Some(url),
        };
        self.db.upsert_message(&message).await?;

        self.notify(&room_id);
        Ok(Some(message))
    }

    /// Room for the conversation between the caller and `peer`.
    fn room_for(&self, ctx: &AuthUser, peer: &str) -> Result<String, AppError> {
        let peer = peer.trim();
        if peer.is_empty() {
            return Err(AppError::Validation("Chat peer is required".to_string()));
        }
        if peer == ctx.uid {
            return Err(AppError::Validation(
                "Cannot chat with yourself".to_string(),
            ));
        }
        Ok(room_id_for(&ctx.uid, peer))
    }

    fn notify(&self, room_id: &str) {
        if let Some(sender) = self.hub.get(room_id) {
            let _ = sender.send(());
        }
    }
}
