// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Symptom log model.

use serde::{Deserialize, Serialize};

/// Stored symptom log entry in Firestore.
///
/// Entries are listed newest-first by `timestamp`; an edit refreshes the
/// timestamp so the entry moves back to the front.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomLog {
    /// Generated log ID (also used as document ID)
    pub log_id: String,
    /// Owning athlete uid
    pub athlete_id: String,
    /// Free-text symptom description
    pub symptom_description: String,
    /// Reported pain level (expected 0-10, presence only is enforced)
    pub pain_level: i64,
    /// Attached media, stored as a resolved URL
    pub media_url: Option<String>,
    /// Top-level media type of the attachment ("image", "video", ...)
    pub media_type: Option<String>,
    /// Creation or last-edit instant (RFC3339)
    pub timestamp: String,
}
