// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration and session routes.
//!
//! Accounts live in the identity provider; profiles live in Firestore.
//! A successful registration or login sets the session cookie and
//! returns the session summary.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE};
use crate::models::{AthleteProfile, PhysioProfile, Role};
use crate::time_utils::format_utc_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register/athlete", post(register_athlete))
        .route("/auth/register/physio", post(register_physio))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Deserialize)]
pub struct RegisterAthleteRequest {
    name: String,
    email: String,
    password: String,
    age: u32,
    sport: String,
}

#[derive(Deserialize)]
pub struct RegisterPhysioRequest {
    name: String,
    email: String,
    password: String,
    specialization: String,
    license_number: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

/// Session opened for a user.
#[derive(Serialize)]
pub struct SessionResponse {
    pub uid: String,
    pub role: Role,
    pub name: String,
}

/// Register an athlete account and open a session.
async fn register_athlete(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterAthleteRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if req.sport.trim().is_empty() {
        return Err(AppError::Validation("Sport is required".to_string()));
    }
    if req.age == 0 || req.age > 120 {
        return Err(AppError::Validation(
            "Age must be between 1 and 120".to_string(),
        ));
    }

    let uid = state.identity.sign_up(&req.email, &req.password).await?;

    let profile = AthleteProfile {
        uid: uid.clone(),
        name: name.to_string(),
        email: req.email.trim().to_lowercase(),
        age: req.age,
        sport: req.sport.trim().to_string(),
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state.db.upsert_athlete(&profile).await?;

    tracing::info!(uid = %uid, role = Role::Athlete.as_str(), "Account registered");
    open_session(&state.config, jar, uid, Role::Athlete, profile.name)
}

/// Register a physiotherapist account and open a session.
async fn register_physio(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<RegisterPhysioRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if req.specialization.trim().is_empty() {
        return Err(AppError::Validation(
            "Specialization is required".to_string(),
        ));
    }
    if req.license_number.trim().is_empty() {
        return Err(AppError::Validation(
            "License number is required".to_string(),
        ));
    }

    let uid = state.identity.sign_up(&req.email, &req.password).await?;

    let profile = PhysioProfile {
        uid: uid.clone(),
        name: name.to_string(),
        email: req.email.trim().to_lowercase(),
        specialization: req.specialization.trim().to_string(),
        license_number: req.license_number.trim().to_string(),
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state.db.upsert_physio(&profile).await?;

    tracing::info!(uid = %uid, role = Role::Physio.as_str(), "Account registered");
    open_session(&state.config, jar, uid, Role::Physio, profile.name)
}

/// Log in with email and password. The role comes from whichever profile
/// collection holds the uid.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let uid = state.identity.sign_in(&req.email, &req.password).await?;

    if let Some(athlete) = state.db.get_athlete(&uid).await? {
        tracing::info!(uid = %uid, role = Role::Athlete.as_str(), "Logged in");
        return open_session(&state.config, jar, uid, Role::Athlete, athlete.name);
    }
    if let Some(physio) = state.db.get_physio(&uid).await? {
        tracing::info!(uid = %uid, role = Role::Physio.as_str(), "Logged in");
        return open_session(&state.config, jar, uid, Role::Physio, physio.name);
    }

    Err(AppError::Forbidden(
        "No profile exists for this account".to_string(),
    ))
}

/// Log out by expiring the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(session_cookie(&state.config, String::new()));
    (jar, StatusCode::NO_CONTENT)
}

/// Issue the JWT and attach the session cookie.
fn open_session(
    config: &Config,
    jar: CookieJar,
    uid: String,
    role: Role,
    name: String,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let token = create_jwt(&uid, role, &config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let jar = jar.add(session_cookie(config, token));
    Ok((jar, Json(SessionResponse { uid, role, name })))
}

/// Session cookie with the attributes shared by creation and removal.
fn session_cookie(config: &Config, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(30))
        .secure(config.frontend_url.starts_with("https"))
        .build()
}
