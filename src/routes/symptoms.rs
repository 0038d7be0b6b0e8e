// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Symptom log routes.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::SymptomLog;
use crate::routes::{bad_multipart, missing_field, read_media_field};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/symptom-logs", post(create_log).get(list_logs))
        .route(
            "/api/symptom-logs/{log_id}",
            put(update_log).delete(delete_log),
        )
        .route("/api/symptom-logs/{log_id}/media", put(replace_media))
}

/// Create a symptom log. Multipart form: `symptom_description`,
/// `pain_level` and an optional `media` file.
async fn create_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SymptomLog>)> {
    let mut description = None;
    let mut pain_level = None;
    let mut media = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name().unwrap_or("") {
            "symptom_description" => {
                description = Some(field.text().await.map_err(bad_multipart)?)
            }
            "pain_level" => {
                let raw = field.text().await.map_err(bad_multipart)?;
                let level = raw
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Validation(format!("Invalid pain_level: {}", raw)))?;
                pain_level = Some(level);
            }
            "media" => media = Some(read_media_field(field).await?),
            _ => {}
        }
    }

    let description = description.ok_or_else(|| missing_field("symptom_description"))?;
    let pain_level = pain_level.ok_or_else(|| missing_field("pain_level"))?;

    let log = state
        .symptoms
        .create(&user, &description, pain_level, media)
        .await?;
    Ok((StatusCode::CREATED, Json(log)))
}

/// The athlete's symptom history, newest first.
async fn list_logs(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<SymptomLog>>> {
    Ok(Json(state.symptoms.list(&user).await?))
}

#[derive(Deserialize)]
struct UpdateLogRequest {
    symptom_description: String,
    pain_level: i64,
}

/// Edit a log's description and pain level.
async fn update_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(log_id): Path<String>,
    Json(req): Json<UpdateLogRequest>,
) -> Result<Json<SymptomLog>> {
    let log = state
        .symptoms
        .update(&user, &log_id, &req.symptom_description, req.pain_level)
        .await?;
    Ok(Json(log))
}

/// Replace a log's media. Multipart form with one `media` file.
async fn replace_media(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(log_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<SymptomLog>> {
    let mut media = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        if field.name().unwrap_or("") == "media" {
            media = Some(read_media_field(field).await?);
        }
    }
    let media = media.ok_or_else(|| missing_field("media"))?;

    let log = state.symptoms.replace_media(&user, &log_id, media).await?;
    Ok(Json(log))
}

/// Delete a log and its media.
async fn delete_log(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(log_id): Path<String>,
) -> Result<StatusCode> {
    state.symptoms.delete(&user, &log_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
