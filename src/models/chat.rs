// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Chat message model and room identity.

use serde::{Deserialize, Serialize};

/// Kind of chat message; exactly one payload field matches the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    File,
    Voice,
}

/// Stored chat message in Firestore. Messages are append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Generated message ID (also used as document ID)
    pub message_id: String,
    /// Room the message belongs to
    pub room_id: String,
    /// Sender uid
    pub sender_id: String,
    /// Send instant (RFC3339, millisecond precision for stable ordering)
    pub timestamp: String,
    pub kind: MessageKind,
    /// Message body for `text` messages
    pub text: Option<String>,
    /// Resolved attachment URL for `file` messages
    pub file_url: Option<String>,
    /// Original filename for `file` messages
    pub file_name: Option<String>,
    /// Resolved clip URL for `voice` messages
    pub voice_url: Option<String>,
}

/// Deterministic room ID for a pair of users.
///
/// Both sides must derive the same room regardless of argument order, so
/// the pair is sorted before joining.
pub fn room_id_for(a: &str, b: &str) -> String {
    if a <= b {
        format!("{}_{}", a, b)
    } else {
        format!("{}_{}", b, a)
    }
}
