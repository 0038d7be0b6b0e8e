// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Exercise workflow: assignment, countdown runs, feedback, review.
//!
//! An exercise moves from `upcoming` to `completed` exactly once, through
//! feedback submission at the end of a countdown run. Countdown runs live in
//! process memory and derive the remaining time from the wall clock; nothing
//! ticks in the background.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::db::Db;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::exercise::build_schedule;
use crate::models::{Exercise, ExerciseSchedule, ExerciseStatus};
use crate::services::media::{MediaStore, MediaUpload};
use crate::time_utils::{format_utc_rfc3339, parse_utc_rfc3339};

/// Feedback stored when the athlete submits an empty text box.
const EMPTY_FEEDBACK_PLACEHOLDER: &str = "No feedback provided";

/// A running countdown for one `(athlete, exercise)` pair.
struct CountdownRun {
    started_at: Instant,
    total_seconds: u64,
}

impl CountdownRun {
    fn status_at(&self, now: Instant) -> CountdownStatus {
        let elapsed = now.saturating_duration_since(self.started_at);
        let remaining_seconds = self.total_seconds.saturating_sub(elapsed.as_secs());
        CountdownStatus {
            remaining_seconds,
            timed_out: remaining_seconds == 0,
        }
    }
}

/// Snapshot of a countdown run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CountdownStatus {
    pub remaining_seconds: u64,
    pub timed_out: bool,
}

/// Input for a new exercise assignment, as parsed from the upload form.
pub struct NewExercise {
    pub athlete_id: String,
    pub title: String,
    pub timer_minutes: u32,
    pub due_date: String,
    pub media: MediaUpload,
}

/// Completion-status filter for the physio review listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewFilter {
    Completed,
    Uncompleted,
}

/// Exercise workflow service.
#[derive(Clone)]
pub struct ExerciseService {
    db: Db,
    media: MediaStore,
    /// Countdown runs keyed by `(athlete uid, exercise id)`, shared across
    /// requests within this instance.
    countdowns: Arc<DashMap<(String, String), CountdownRun>>,
}

impl ExerciseService {
    pub fn new(db: Db, media: MediaStore) -> Self {
        Self {
            db,
            media,
            countdowns: Arc::new(DashMap::new()),
        }
    }

    /// Assign a new exercise to an athlete.
    ///
    /// The demonstration media is uploaded before the record is written, so
    /// an upload failure leaves no exercise behind.
    pub async fn create_exercise(
        &self,
        ctx: &AuthUser,
        input: NewExercise,
    ) -> Result<Exercise, AppError> {
        ctx.require_physio()?;

        let title = input.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation(
                "Exercise title is required".to_string(),
            ));
        }
        if input.timer_minutes < 1 {
            return Err(AppError::Validation(
                "Timer must be at least one minute".to_string(),
            ));
        }
        if input.media.data.is_empty() {
            return Err(AppError::Validation(
                "A demonstration video or image is required".to_string(),
            ));
        }
        let due = parse_due_date(&input.due_date)?;
        if self.db.get_athlete(&input.athlete_id).await?.is_none() {
            return Err(AppError::Validation(format!(
                "Unknown athlete {}",
                input.athlete_id
            )));
        }

        let now = Utc::now();
        let object = format!("exercises/{}/{}", input.athlete_id, now.timestamp_millis());
        self.media
            .upload(&object, input.media.data, &input.media.content_type)
            .await?;

        let mut exercise = Exercise {
            exercise_id: uuid::Uuid::new_v4().simple().to_string(),
            athlete_id: input.athlete_id,
            assigned_by: ctx.uid.clone(),
            title: title.to_string(),
            timer_minutes: input.timer_minutes,
            media_url: object,
            completion_date: format_utc_rfc3339(due),
            status: ExerciseStatus::Upcoming,
            feedback: None,
            pain_level: None,
            rating: None,
            created_at: format_utc_rfc3339(now),
        };
        self.db.upsert_exercise(&exercise).await?;

        tracing::info!(
            exercise_id = %exercise.exercise_id,
            athlete_id = %exercise.athlete_id,
            "Exercise assigned"
        );
        // The document keeps the object path; responses carry a fetchable URL.
        exercise.media_url = self.media.resolve_url(&exercise.media_url);
        Ok(exercise)
    }

    /// The athlete's program, grouped by day and split into upcoming and
    /// completed. Stored media references are resolved to fetchable URLs.
    pub async fn list_exercises(&self, ctx: &AuthUser) -> Result<ExerciseSchedule, AppError> {
        ctx.require_athlete()?;

        let mut exercises = self.db.exercises_for_athlete(&ctx.uid).await?;
        for exercise in &mut exercises {
            exercise.media_url = self.media.resolve_url(&exercise.media_url);
        }

        Ok(build_schedule(exercises, Utc::now().date_naive()))
    }

    /// One athlete's exercises filtered by completion status, newest first,
    /// for the physio's progress review.
    pub async fn list_for_review(
        &self,
        ctx: &AuthUser,
        athlete_id: &str,
        filter: ReviewFilter,
    ) -> Result<Vec<Exercise>, AppError> {
        ctx.require_physio()?;

        let mut exercises = self.db.exercises_for_athlete(athlete_id).await?;
        exercises.retain(|exercise| match filter {
            ReviewFilter::Completed => exercise.status == ExerciseStatus::Completed,
            ReviewFilter::Uncompleted => exercise.status != ExerciseStatus::Completed,
        });
        for exercise in &mut exercises {
            exercise.media_url = self.media.resolve_url(&exercise.media_url);
        }

        Ok(exercises)
    }

    /// Start (or restart) the countdown run for an exercise.
    pub async fn start_exercise(
        &self,
        ctx: &AuthUser,
        exercise_id: &str,
    ) -> Result<CountdownStatus, AppError> {
        let exercise = self.owned_exercise(ctx, exercise_id).await?;

        let total_seconds = u64::from(exercise.timer_minutes) * 60;
        self.countdowns.insert(
            (ctx.uid.clone(), exercise_id.to_string()),
            CountdownRun {
                started_at: Instant::now(),
                total_seconds,
            },
        );

        Ok(CountdownStatus {
            remaining_seconds: total_seconds,
            timed_out: total_seconds == 0,
        })
    }

    /// Remaining time for an exercise whose countdown has been started.
    pub async fn countdown(
        &self,
        ctx: &AuthUser,
        exercise_id: &str,
    ) -> Result<CountdownStatus, AppError> {
        ctx.require_athlete()?;

        let key = (ctx.uid.clone(), exercise_id.to_string());
        let run = self
            .countdowns
            .get(&key)
            .ok_or_else(|| AppError::Precondition("Countdown has not been started".to_string()))?;

        Ok(run.status_at(Instant::now()))
    }

    /// Complete an exercise with the athlete's feedback.
    ///
    /// Requires a countdown run unless the exercise is already completed, in
    /// which case re-submission simply overwrites. The run is dropped only
    /// after the write succeeds.
    pub async fn submit_feedback(
        &self,
        ctx: &AuthUser,
        exercise_id: &str,
        feedback: &str,
        pain_level: &str,
    ) -> Result<Exercise, AppError> {
        let mut exercise = self.owned_exercise(ctx, exercise_id).await?;

        let key = (ctx.uid.clone(), exercise_id.to_string());
        if !self.countdowns.contains_key(&key) && exercise.status != ExerciseStatus::Completed {
            return Err(AppError::Precondition(
                "Exercise has not been started".to_string(),
            ));
        }

        exercise.feedback = Some(normalize_feedback(feedback));
        exercise.pain_level = Some(parse_pain_level(pain_level));
        exercise.status = ExerciseStatus::Completed;
        exercise.completion_date = format_utc_rfc3339(Utc::now());
        self.db.upsert_exercise(&exercise).await?;

        self.countdowns.remove(&key);
        tracing::info!(exercise_id, "Exercise completed");
        exercise.media_url = self.media.resolve_url(&exercise.media_url);
        Ok(exercise)
    }

    /// Edit feedback and rating on an exercise after completion. Status and
    /// completion date stay as they are.
    pub async fn save_feedback(
        &self,
        ctx: &AuthUser,
        exercise_id: &str,
        feedback: &str,
        rating: i64,
    ) -> Result<Exercise, AppError> {
        let mut exercise = self.owned_exercise(ctx, exercise_id).await?;

        exercise.feedback = Some(normalize_feedback(feedback));
        exercise.rating = Some(rating);
        self.db.upsert_exercise(&exercise).await?;

        exercise.media_url = self.media.resolve_url(&exercise.media_url);
        Ok(exercise)
    }

    /// Fetch an exercise the calling athlete owns.
    async fn owned_exercise(
        &self,
        ctx: &AuthUser,
        exercise_id: &str,
    ) -> Result<Exercise, AppError> {
        ctx.require_athlete()?;

        let exercise = self
            .db
            .get_exercise(exercise_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Exercise {}", exercise_id)))?;
        if exercise.athlete_id != ctx.uid {
            return Err(AppError::Forbidden(
                "Exercise belongs to another athlete".to_string(),
            ));
        }

        Ok(exercise)
    }
}

/// Due dates arrive either as a full RFC 3339 timestamp or a bare
/// `YYYY-MM-DD` day.
fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = raw.trim();
    if let Some(dt) = parse_utc_rfc3339(raw) {
        return Ok(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| AppError::Validation(format!("Invalid due date: {}", raw)))
}

/// Pain level arrives as free text from the feedback form; anything
/// unparseable counts as 0.
fn parse_pain_level(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}

fn normalize_feedback(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        EMPTY_FEEDBACK_PLACEHOLDER.to_string()
    } else {
        trimmed.to_string()
    }
}
