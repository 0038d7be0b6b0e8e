// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile routes: the current user and the peer directories.

use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AthleteProfile, PhysioProfile, Role};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/athletes", get(list_athletes))
        .route("/api/physios", get(list_physios))
}

/// Profile of the authenticated user. Role-specific fields are omitted
/// when they do not apply.
#[derive(Serialize)]
pub struct MeResponse {
    pub uid: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sport: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
}

/// Get the current user's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    match user.role {
        Role::Athlete => {
            let profile = state
                .db
                .get_athlete(&user.uid)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Athlete {}", user.uid)))?;
            Ok(Json(MeResponse {
                uid: profile.uid,
                role: Role::Athlete,
                name: profile.name,
                email: profile.email,
                age: Some(profile.age),
                sport: Some(profile.sport),
                specialization: None,
                license_number: None,
            }))
        }
        Role::Physio => {
            let profile = state
                .db
                .get_physio(&user.uid)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Physio {}", user.uid)))?;
            Ok(Json(MeResponse {
                uid: profile.uid,
                role: Role::Physio,
                name: profile.name,
                email: profile.email,
                age: None,
                sport: None,
                specialization: Some(profile.specialization),
                license_number: Some(profile.license_number),
            }))
        }
    }
}

/// Directory of athletes, for the physio's client list.
async fn list_athletes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<AthleteProfile>>> {
    user.require_physio()?;
    Ok(Json(state.db.list_athletes().await?))
}

/// Directory of physiotherapists, for the athlete's contact picker.
async fn list_physios(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<PhysioProfile>>> {
    user.require_athlete()?;
    Ok(Json(state.db.list_physios().await?))
}
