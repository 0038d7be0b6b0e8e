// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Symptom log: a per-athlete journal of symptom entries with optional media.
//!
//! Entries are listed newest first. Edits refresh the timestamp, so an edited
//! entry moves to the front. Blob cleanup on delete and replace is
//! best-effort; the record write is what counts.

use chrono::Utc;

use crate::db::Db;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::SymptomLog;
use crate::services::media::{MediaStore, MediaUpload};
use crate::time_utils::format_utc_rfc3339;

/// Symptom log service.
#[derive(Clone)]
pub struct SymptomLogService {
    db: Db,
    media: MediaStore,
}

impl SymptomLogService {
    pub fn new(db: Db, media: MediaStore) -> Self {
        Self { db, media }
    }

    /// Create a new entry. Media, when present, is uploaded before the
    /// record is written.
    pub async fn create(
        &self,
        ctx: &AuthUser,
        description: &str,
        pain_level: i64,
        media: Option<MediaUpload>,
    ) -> Result<SymptomLog, AppError> {
        ctx.require_athlete()?;

        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::Validation(
                "Symptom description is required".to_string(),
            ));
        }

        let now = Utc::now();
        let (media_url, media_type) = match media {
            Some(upload) if !upload.data.is_empty() => {
                let object = format!("symptoms/{}/{}", ctx.uid, now.timestamp_millis());
                let url = self
                    .media
                    .upload(&object, upload.data, &upload.content_type)
                    .await?;
                (Some(url), Some(media_type_of(&upload.content_type)))
            }
            _ => (None, None),
        };

        let log = SymptomLog {
            log_id: uuid::Uuid::new_v4().simple().to_string(),
            athlete_id: ctx.uid.clone(),
            symptom_description: description.to_string(),
            pain_level,
            media_url,
            media_type,
            timestamp: format_utc_rfc3339(now),
        };
        self.db.upsert_symptom_log(&log).await?;

        tracing::info!(log_id = %log.log_id, "Symptom log created");
        Ok(log)
    }

    /// The caller's entries, newest first.
    pub async fn list(&self, ctx: &AuthUser) -> Result<Vec<SymptomLog>, AppError> {
        ctx.require_athlete()?;
        self.db.symptom_logs_for_athlete(&ctx.uid).await
    }

    /// Edit description and pain level. The timestamp is refreshed, so the
    /// entry becomes the newest one.
    pub async fn update(
        &self,
        ctx: &AuthUser,
        log_id: &str,
        description: &str,
        pain_level: i64,
    ) -> Result<SymptomLog, AppError> {
        let mut log = self.owned_log(ctx, log_id).await?;

        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::Validation(
                "Symptom description is required".to_string(),
            ));
        }

        log.symptom_description = description.to_string();
        log.pain_level = pain_level;
        log.timestamp = format_utc_rfc3339(Utc::now());
        self.db.upsert_symptom_log(&log).await?;

        Ok(log)
    }

    /// Swap the entry's media for a new blob. The old blob is deleted
    /// best-effort after the record points at the new one.
    pub async fn replace_media(
        &self,
        ctx: &AuthUser,
        log_id: &str,
        media: MediaUpload,
    ) -> Result<SymptomLog, AppError> {
        let mut log = self.owned_log(ctx, log_id).await?;

        if media.data.is_empty() {
            return Err(AppError::Validation(
                "Replacement media is empty".to_string(),
            ));
        }

        let object = format!("symptoms/{}/{}", ctx.uid, Utc::now().timestamp_millis());
        let url = self
            .media
            .upload(&object, media.data, &media.content_type)
            .await?;

        let previous = log.media_url.replace(url);
        log.media_type = Some(media_type_of(&media.content_type));
        self.db.upsert_symptom_log(&log).await?;

        if let Some(old_url) = previous {
            if let Err(e) = self.media.delete_by_url(&old_url).await {
                tracing::warn!(error = %e, log_id, "Failed to delete replaced symptom media");
            }
        }

        Ok(log)
    }

    /// Delete an entry, cascading to its blob best-effort.
    pub async fn delete(&self, ctx: &AuthUser, log_id: &str) -> Result<(), AppError> {
        let log = self.owned_log(ctx, log_id).await?;

        if let Some(url) = &log.media_url {
            if let Err(e) = self.media.delete_by_url(url).await {
                tracing::warn!(error = %e, log_id, "Failed to delete symptom media");
            }
        }
        self.db.delete_symptom_log(log_id).await?;

        tracing::info!(log_id, "Symptom log deleted");
        Ok(())
    }

    /// Fetch an entry the calling athlete owns.
    async fn owned_log(&self, ctx: &AuthUser, log_id: &str) -> Result<SymptomLog, AppError> {
        ctx.require_athlete()?;

        let log = self
            .db
            .get_symptom_log(log_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Symptom log {}", log_id)))?;
        if log.athlete_id != ctx.uid {
            return Err(AppError::Forbidden(
                "Symptom log belongs to another athlete".to_string(),
            ));
        }

        Ok(log)
    }
}

/// Coarse media type stored alongside the URL ("image", "video", ...).
fn media_type_of(content_type: &str) -> String {
    content_type
        .split('/')
        .next()
        .unwrap_or("file")
        .to_string()
}
