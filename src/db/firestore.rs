// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Athlete and physio profiles
//! - Exercises (assigned programs)
//! - Symptom logs
//! - Chat messages

use crate::db::collections;
use crate::error::AppError;
use crate::models::{AthleteProfile, ChatMessage, Exercise, PhysioProfile, SymptomLog};
use firestore::FirestoreQueryDirection;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDirectory {
    client: firestore::FirestoreDb,
}

impl FirestoreDirectory {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Transport(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        // Use ExternalJwtFunctionSource to provide a dummy token without needing async-trait
        // or a custom TokenSource implementation struct.
        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Transport(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Profile Operations ──────────────────────────────────────

    /// Get an athlete profile by uid.
    pub async fn get_athlete(&self, uid: &str) -> Result<Option<AthleteProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::ATHLETES)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }

    /// Create or update an athlete profile.
    pub async fn upsert_athlete(&self, profile: &AthleteProfile) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::ATHLETES)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        Ok(())
    }

    /// List all athlete profiles, ordered by name.
    pub async fn list_athletes(&self) -> Result<Vec<AthleteProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::ATHLETES)
            .order_by([("name", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }

    /// Get a physio profile by uid.
    pub async fn get_physio(&self, uid: &str) -> Result<Option<PhysioProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::PHYSIOS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }

    /// Create or update a physio profile.
    pub async fn upsert_physio(&self, profile: &PhysioProfile) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::PHYSIOS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        Ok(())
    }

    /// List all physio profiles, ordered by name.
    pub async fn list_physios(&self) -> Result<Vec<PhysioProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .from(collections::PHYSIOS)
            .order_by([("name", FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }

    // ─── Exercise Operations ─────────────────────────────────────

    /// Get an exercise by ID.
    pub async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::EXERCISES)
            .obj()
            .one(exercise_id)
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }

    /// Create or update an exercise.
    pub async fn upsert_exercise(&self, exercise: &Exercise) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::EXERCISES)
            .document_id(&exercise.exercise_id)
            .object(exercise)
            .execute()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        Ok(())
    }

    /// Get all exercises assigned to an athlete, newest due date first.
    pub async fn exercises_for_athlete(&self, athlete_id: &str) -> Result<Vec<Exercise>, AppError> {
        let athlete_id = athlete_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::EXERCISES)
            .filter(move |q| q.for_all([q.field("athlete_id").eq(athlete_id.clone())]))
            .order_by([("completion_date", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }

    // ─── Symptom Log Operations ──────────────────────────────────

    /// Get a symptom log entry by ID.
    pub async fn get_symptom_log(&self, log_id: &str) -> Result<Option<SymptomLog>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::SYMPTOM_LOGS)
            .obj()
            .one(log_id)
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }

    /// Create or update a symptom log entry.
    pub async fn upsert_symptom_log(&self, log: &SymptomLog) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::SYMPTOM_LOGS)
            .document_id(&log.log_id)
            .object(log)
            .execute()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        Ok(())
    }

    /// Delete a symptom log entry.
    pub async fn delete_symptom_log(&self, log_id: &str) -> Result<(), AppError> {
        self.client
            .fluent()
            .delete()
            .from(collections::SYMPTOM_LOGS)
            .document_id(log_id)
            .execute()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        Ok(())
    }

    /// Get an athlete's symptom logs, newest first.
    pub async fn symptom_logs_for_athlete(
        &self,
        athlete_id: &str,
    ) -> Result<Vec<SymptomLog>, AppError> {
        let athlete_id = athlete_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::SYMPTOM_LOGS)
            .filter(move |q| q.for_all([q.field("athlete_id").eq(athlete_id.clone())]))
            .order_by([("timestamp", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }

    // ─── Chat Operations ─────────────────────────────────────────

    /// Append a chat message.
    pub async fn upsert_message(&self, message: &ChatMessage) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::CHAT_MESSAGES)
            .document_id(&message.message_id)
            .object(message)
            .execute()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;
        Ok(())
    }

    /// Get all messages in a room, most recent first.
    pub async fn messages_for_room(&self, room_id: &str) -> Result<Vec<ChatMessage>, AppError> {
        let room_id = room_id.to_string();
        self.client
            .fluent()
            .select()
            .from(collections::CHAT_MESSAGES)
            .filter(move |q| q.for_all([q.field("room_id").eq(room_id.clone())]))
            .order_by([("timestamp", FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))
    }
}
