// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat tests over in-memory backends: ordering, attachments, voice
//! captures and live notifications.

mod common;

use common::{athlete_ctx, memory_state, memory_state_with_media, physio_ctx, test_media};
use rehab_tracker::error::AppError;
use rehab_tracker::models::MessageKind;
use rehab_tracker::services::MediaStore;
use std::time::Duration;

#[tokio::test]
async fn test_messages_are_most_recent_first() {
    let state = memory_state();
    let ath = athlete_ctx("ath1");
    let pt = physio_ctx("pt1");

    for text in ["one", "two", "three"] {
        state
            .chat
            .send_text(&ath, "pt1", text)
            .await
            .expect("Send failed");
        // Keep timestamps strictly increasing at millisecond precision
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let messages = state
        .chat
        .messages(&ath, "pt1")
        .await
        .expect("Listing failed");
    let texts: Vec<&str> = messages
        .iter()
        .map(|m| m.text.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(texts, vec!["three", "two", "one"]);

    // The same conversation is visible from the other side
    let from_physio = state
        .chat
        .messages(&pt, "ath1")
        .await
        .expect("Listing failed");
    assert_eq!(from_physio.len(), 3);
    assert_eq!(from_physio[0].sender_id, "ath1");
}

#[tokio::test]
async fn test_send_text_validation() {
    let state = memory_state();
    let ath = athlete_ctx("ath1");

    let err = state.chat.send_text(&ath, "pt1", "   ").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = state.chat.send_text(&ath, "", "hello").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = state.chat.send_text(&ath, "ath1", "hello").await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)), "self-chat: {err}");
}

#[tokio::test]
async fn test_send_file_keeps_original_name() {
    let state = memory_state();
    let ath = athlete_ctx("ath1");

    let message = state
        .chat
        .send_file(&ath, "pt1", test_media("mri scan.pdf", "application/pdf"))
        .await
        .expect("File send failed");

    assert_eq!(message.kind, MessageKind::File);
    // Display name keeps the original; only the object path is sanitized
    assert_eq!(message.file_name.as_deref(), Some("mri scan.pdf"));
    let url = message.file_url.expect("File message carries a URL");
    assert!(url.contains("mri_scan.pdf"));
    assert!(state
        .media
        .exists_by_url(&url)
        .await
        .expect("Existence check failed"));
}

#[tokio::test]
async fn test_failed_upload_appends_no_message() {
    let state = memory_state_with_media(MediaStore::failing());
    let ath = athlete_ctx("ath1");

    let err = state
        .chat
        .send_file(&ath, "pt1", test_media("scan.pdf", "application/pdf"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Transport(_)));

    let messages = state
        .chat
        .messages(&ath, "pt1")
        .await
        .expect("Listing failed");
    assert!(messages.is_empty(), "Failed upload must not append");
}

#[tokio::test]
async fn test_voice_capture_flow() {
    let state = memory_state();
    let ath = athlete_ctx("ath1");

    state.chat.start_voice(&ath, "pt1").expect("Start failed");
    state
        .chat
        .push_voice_chunk(&ath, "pt1", &[1, 2, 3])
        .expect("Chunk failed");
    state
        .chat
        .push_voice_chunk(&ath, "pt1", &[4, 5])
        .expect("Chunk failed");

    let message = state
        .chat
        .stop_voice(&ath, "pt1")
        .await
        .expect("Stop failed")
        .expect("Recorded capture should yield a message");

    assert_eq!(message.kind, MessageKind::Voice);
    let url = message.voice_url.expect("Voice message carries a URL");
    assert!(url.ends_with(".m4a"));
    assert!(state
        .media
        .exists_by_url(&url)
        .await
        .expect("Existence check failed"));

    // The capture is consumed; stopping again is a no-op
    let none = state.chat.stop_voice(&ath, "pt1").await.expect("Stop failed");
    assert!(none.is_none());

    let messages = state
        .chat
        .messages(&ath, "pt1")
        .await
        .expect("Listing failed");
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_voice_edge_cases() {
    let state = memory_state();
    let ath = athlete_ctx("ath1");

    // Stop without start is a no-op
    let none = state.chat.stop_voice(&ath, "pt1").await.expect("Stop failed");
    assert!(none.is_none());

    // Chunks need an active capture
    let err = state
        .chat
        .push_voice_chunk(&ath, "pt1", &[1])
        .unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)));

    // An empty capture is discarded
    state.chat.start_voice(&ath, "pt1").expect("Start failed");
    let none = state.chat.stop_voice(&ath, "pt1").await.expect("Stop failed");
    assert!(none.is_none());

    let messages = state
        .chat
        .messages(&ath, "pt1")
        .await
        .expect("Listing failed");
    assert!(messages.is_empty());
}

#[tokio::test]
async fn test_restart_discards_previous_capture() {
    let state = memory_state();
    let ath = athlete_ctx("ath1");

    state.chat.start_voice(&ath, "pt1").expect("Start failed");
    state
        .chat
        .push_voice_chunk(&ath, "pt1", &[1, 2, 3])
        .expect("Chunk failed");

    // Starting again throws away what was recorded so far
    state.chat.start_voice(&ath, "pt1").expect("Restart failed");
    let none = state.chat.stop_voice(&ath, "pt1").await.expect("Stop failed");
    assert!(none.is_none());
}

#[tokio::test]
async fn test_oversized_capture_is_rejected_and_discarded() {
    let state = memory_state();
    let ath = athlete_ctx("ath1");

    state.chat.start_voice(&ath, "pt1").expect("Start failed");
    let big = vec![0u8; 10 * 1024 * 1024 + 1];
    let err = state.chat.push_voice_chunk(&ath, "pt1", &big).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // The overflowing capture is gone entirely
    let err = state.chat.push_voice_chunk(&ath, "pt1", &[1]).unwrap_err();
    assert!(matches!(err, AppError::Precondition(_)));
}

#[tokio::test]
async fn test_watch_fires_on_append() {
    let state = memory_state();
    let ath = athlete_ctx("ath1");
    let pt = physio_ctx("pt1");

    let (room_id, mut rx) = state.chat.watch(&pt, "ath1").expect("Watch failed");
    assert_eq!(room_id, "ath1_pt1");

    state
        .chat
        .send_text(&ath, "pt1", "how is the knee?")
        .await
        .expect("Send failed");

    tokio::time::timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("No notification within timeout")
        .expect("Notification channel closed");

    // The snapshot read after the tick sees the new message
    let messages = state
        .chat
        .messages(&pt, "ath1")
        .await
        .expect("Listing failed");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].text.as_deref(), Some("how is the knee?"));
}
