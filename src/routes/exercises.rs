// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise routes: assignment, the athlete's program, countdown timing
//! and feedback.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Exercise, ExerciseSchedule};
use crate::routes::{bad_multipart, missing_field, read_media_field};
use crate::services::exercise::{CountdownStatus, NewExercise, ReviewFilter};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/exercises", post(create_exercise).get(list_exercises))
        .route("/api/athletes/{athlete_id}/exercises", get(list_for_review))
        .route("/api/exercises/{exercise_id}/start", post(start_exercise))
        .route("/api/exercises/{exercise_id}/countdown", get(countdown))
        .route(
            "/api/exercises/{exercise_id}/feedback",
            post(submit_feedback).put(save_feedback),
        )
}

// ─── Assignment ───

/// Assign an exercise. Multipart form: `athlete_id`, `title`,
/// `timer_minutes`, `due_date` and the demonstration `media` file.
async fn create_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Exercise>)> {
    let input = parse_new_exercise(multipart).await?;
    let exercise = state.exercises.create_exercise(&user, input).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

async fn parse_new_exercise(mut multipart: Multipart) -> Result<NewExercise> {
    let mut athlete_id = None;
    let mut title = None;
    let mut timer_minutes = None;
    let mut due_date = None;
    let mut media = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        match field.name().unwrap_or("") {
            "athlete_id" => athlete_id = Some(field.text().await.map_err(bad_multipart)?),
            "title" => title = Some(field.text().await.map_err(bad_multipart)?),
            "timer_minutes" => {
                let raw = field.text().await.map_err(bad_multipart)?;
                let minutes = raw
                    .trim()
                    .parse()
                    .map_err(|_| AppError::Validation(format!("Invalid timer_minutes: {}", raw)))?;
                timer_minutes = Some(minutes);
            }
            "due_date" => due_date = Some(field.text().await.map_err(bad_multipart)?),
            "media" => media = Some(read_media_field(field).await?),
            _ => {}
        }
    }

    Ok(NewExercise {
        athlete_id: athlete_id.ok_or_else(|| missing_field("athlete_id"))?,
        title: title.ok_or_else(|| missing_field("title"))?,
        timer_minutes: timer_minutes.ok_or_else(|| missing_field("timer_minutes"))?,
        due_date: due_date.ok_or_else(|| missing_field("due_date"))?,
        media: media.ok_or_else(|| missing_field("media"))?,
    })
}

// ─── Program ───

/// The athlete's exercise program, grouped into today / upcoming / expired
/// / completed.
async fn list_exercises(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ExerciseSchedule>> {
    Ok(Json(state.exercises.list_exercises(&user).await?))
}

#[derive(Deserialize)]
struct ReviewQuery {
    status: ReviewFilter,
}

/// One athlete's exercises for the physio's progress review, filtered by
/// `?status=completed` or `?status=uncompleted`.
async fn list_for_review(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(athlete_id): Path<String>,
    Query(query): Query<ReviewQuery>,
) -> Result<Json<Vec<Exercise>>> {
    let exercises = state
        .exercises
        .list_for_review(&user, &athlete_id, query.status)
        .await?;
    Ok(Json(exercises))
}

// ─── Countdown and feedback ───

/// Start (or restart) the countdown for an exercise.
async fn start_exercise(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(exercise_id): Path<String>,
) -> Result<Json<CountdownStatus>> {
    Ok(Json(state.exercises.start_exercise(&user, &exercise_id).await?))
}

/// Remaining countdown time.
async fn countdown(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(exercise_id): Path<String>,
) -> Result<Json<CountdownStatus>> {
    Ok(Json(state.exercises.countdown(&user, &exercise_id).await?))
}

#[derive(Deserialize)]
struct SubmitFeedbackRequest {
    #[serde(default)]
    feedback: String,
    #[serde(default)]
    pain_level: String,
}

/// Complete the exercise with feedback at the end of a countdown.
async fn submit_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(exercise_id): Path<String>,
    Json(req): Json<SubmitFeedbackRequest>,
) -> Result<Json<Exercise>> {
    let exercise = state
        .exercises
        .submit_feedback(&user, &exercise_id, &req.feedback, &req.pain_level)
        .await?;
    Ok(Json(exercise))
}

#[derive(Deserialize)]
struct SaveFeedbackRequest {
    #[serde(default)]
    feedback: String,
    rating: i64,
}

/// Edit the feedback and rating of a completed exercise.
async fn save_feedback(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(exercise_id): Path<String>,
    Json(req): Json<SaveFeedbackRequest>,
) -> Result<Json<Exercise>> {
    let exercise = state
        .exercises
        .save_feedback(&user, &exercise_id, &req.feedback, req.rating)
        .await?;
    Ok(Json(exercise))
}
