// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use rehab_tracker::config::Config;
use rehab_tracker::db::Db;
use rehab_tracker::middleware::auth::{create_jwt, AuthUser, SESSION_COOKIE};
use rehab_tracker::models::{AthleteProfile, PhysioProfile, Role};
use rehab_tracker::routes::create_router;
use rehab_tracker::services::{
    ChatService, ExerciseService, IdentityService, MediaStore, MediaUpload, NewExercise,
    SymptomLogService,
};
use rehab_tracker::time_utils::format_utc_rfc3339;
use rehab_tracker::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection (Firestore emulator).
#[allow(dead_code)]
pub async fn test_db() -> Db {
    Db::connect("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Shared state over in-memory backends (no emulator needed).
#[allow(dead_code)]
pub fn memory_state() -> Arc<AppState> {
    memory_state_with_media(MediaStore::in_memory())
}

/// Same as [`memory_state`] but with a caller-chosen media backend.
#[allow(dead_code)]
pub fn memory_state_with_media(media: MediaStore) -> Arc<AppState> {
    state_with(Config::default(), media)
}

fn state_with(config: Config, media: MediaStore) -> Arc<AppState> {
    let db = Db::in_memory();
    let identity = IdentityService::in_memory();

    let exercises = ExerciseService::new(db.clone(), media.clone());
    let chat = ChatService::new(db.clone(), media.clone());
    let symptoms = SymptomLogService::new(db.clone(), media.clone());

    Arc::new(AppState {
        config,
        db,
        media,
        identity,
        exercises,
        chat,
        symptoms,
    })
}

/// Create a test app over in-memory backends.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = memory_state();
    (create_router(state.clone()), state)
}

/// Create a test app with a specific frontend URL, which drives cookie
/// `Secure` attributes and CORS.
#[allow(dead_code)]
pub fn create_test_app_with_frontend_url(frontend_url: &str) -> (axum::Router, Arc<AppState>) {
    let config = Config {
        frontend_url: frontend_url.to_string(),
        ..Config::default()
    };
    let state = state_with(config, MediaStore::in_memory());
    (create_router(state.clone()), state)
}

/// Authenticated athlete context for direct service calls.
#[allow(dead_code)]
pub fn athlete_ctx(uid: &str) -> AuthUser {
    AuthUser {
        uid: uid.to_string(),
        role: Role::Athlete,
    }
}

/// Authenticated physiotherapist context for direct service calls.
#[allow(dead_code)]
pub fn physio_ctx(uid: &str) -> AuthUser {
    AuthUser {
        uid: uid.to_string(),
        role: Role::Physio,
    }
}

/// Session cookie header value for requests against the test app.
#[allow(dead_code)]
pub fn session_cookie_for(state: &AppState, uid: &str, role: Role) -> String {
    let token = create_jwt(uid, role, &state.config.jwt_signing_key).expect("JWT creation failed");
    format!("{}={}", SESSION_COOKIE, token)
}

/// Seed an athlete profile.
#[allow(dead_code)]
pub async fn seed_athlete(state: &AppState, uid: &str, name: &str) {
    let profile = AthleteProfile {
        uid: uid.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", uid),
        age: 24,
        sport: "Climbing".to_string(),
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state
        .db
        .upsert_athlete(&profile)
        .await
        .expect("Failed to seed athlete");
}

/// Seed a physiotherapist profile.
#[allow(dead_code)]
pub async fn seed_physio(state: &AppState, uid: &str, name: &str) {
    let profile = PhysioProfile {
        uid: uid.to_string(),
        name: name.to_string(),
        email: format!("{}@example.com", uid),
        specialization: "Sports rehabilitation".to_string(),
        license_number: "PT-1234".to_string(),
        created_at: format_utc_rfc3339(chrono::Utc::now()),
    };
    state
        .db
        .upsert_physio(&profile)
        .await
        .expect("Failed to seed physio");
}

/// A small media upload for tests.
#[allow(dead_code)]
pub fn test_media(file_name: &str, content_type: &str) -> MediaUpload {
    MediaUpload {
        data: vec![1, 2, 3, 4],
        file_name: file_name.to_string(),
        content_type: content_type.to_string(),
    }
}

/// A new-exercise input with a small test video.
#[allow(dead_code)]
pub fn new_exercise(athlete_id: &str, title: &str, timer_minutes: u32, due_date: &str) -> NewExercise {
    NewExercise {
        athlete_id: athlete_id.to_string(),
        title: title.to_string(),
        timer_minutes,
        due_date: due_date.to_string(),
        media: test_media("demo.mp4", "video/mp4"),
    }
}
