// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory directory backend for tests and offline development.
//!
//! Mirrors the Firestore wrapper's operations over concurrent maps,
//! including the same result ordering.

use crate::error::AppError;
use crate::models::{AthleteProfile, ChatMessage, Exercise, PhysioProfile, SymptomLog};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Default)]
struct MemoryInner {
    athletes: DashMap<String, AthleteProfile>,
    physios: DashMap<String, PhysioProfile>,
    exercises: DashMap<String, Exercise>,
    symptom_logs: DashMap<String, SymptomLog>,
    chat_messages: DashMap<String, ChatMessage>,
}

/// Concurrent-map store with the same surface as the Firestore wrapper.
#[derive(Clone, Default)]
pub struct MemoryDirectory {
    inner: Arc<MemoryInner>,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_athlete(&self, uid: &str) -> Result<Option<AthleteProfile>, AppError> {
        Ok(self.inner.athletes.get(uid).map(|p| p.clone()))
    }

    pub async fn upsert_athlete(&self, profile: &AthleteProfile) -> Result<(), AppError> {
        self.inner
            .athletes
            .insert(profile.uid.clone(), profile.clone());
        Ok(())
    }

    pub async fn list_athletes(&self) -> Result<Vec<AthleteProfile>, AppError> {
        let mut profiles: Vec<AthleteProfile> = self
            .inner
            .athletes
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    pub async fn get_physio(&self, uid: &str) -> Result<Option<PhysioProfile>, AppError> {
        Ok(self.inner.physios.get(uid).map(|p| p.clone()))
    }

    pub async fn upsert_physio(&self, profile: &PhysioProfile) -> Result<(), AppError> {
        self.inner
            .physios
            .insert(profile.uid.clone(), profile.clone());
        Ok(())
    }

    pub async fn list_physios(&self) -> Result<Vec<PhysioProfile>, AppError> {
        let mut profiles: Vec<PhysioProfile> = self
            .inner
            .physios
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    pub async fn get_exercise(&self, exercise_id: &str) -> Result<Option<Exercise>, AppError> {
        Ok(self.inner.exercises.get(exercise_id).map(|e| e.clone()))
    }

    pub async fn upsert_exercise(&self, exercise: &Exercise) -> Result<(), AppError> {
        self.inner
            .exercises
            .insert(exercise.exercise_id.clone(), exercise.clone());
        Ok(())
    }

    pub async fn exercises_for_athlete(&self, athlete_id: &str) -> Result<Vec<Exercise>, AppError> {
        let mut exercises: Vec<Exercise> = self
            .inner
            .exercises
            .iter()
            .filter(|entry| entry.value().athlete_id == athlete_id)
            .map(|entry| entry.value().clone())
            .collect();
        exercises.sort_by(|a, b| {
            b.completion_date
                .cmp(&a.completion_date)
                .then_with(|| b.exercise_id.cmp(&a.exercise_id))
        });
        Ok(exercises)
    }

    pub async fn get_symptom_log(&self, log_id: &str) -> Result<Option<SymptomLog>, AppError> {
        Ok(self.inner.symptom_logs.get(log_id).map(|l| l.clone()))
    }

    pub async fn upsert_symptom_log(&self, log: &SymptomLog) -> Result<(), AppError> {
        self.inner
            .symptom_logs
            .insert(log.log_id.clone(), log.clone());
        Ok(())
    }

    pub async fn delete_symptom_log(&self, log_id: &str) -> Result<(), AppError> {
        self.inner.symptom_logs.remove(log_id);
        Ok(())
    }

    pub async fn symptom_logs_for_athlete(
        &self,
        athlete_id: &str,
    ) -> Result<Vec<SymptomLog>, AppError> {
        let mut logs: Vec<SymptomLog> = self
            .inner
            .symptom_logs
            .iter()
            .filter(|entry| entry.value().athlete_id == athlete_id)
            .map(|entry| entry.value().clone())
            .collect();
        logs.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.log_id.cmp(&a.log_id))
        });
        Ok(logs)
    }

    pub async fn upsert_message(&self, message: &ChatMessage) -> Result<(), AppError> {
        self.inner
            .chat_messages
            .insert(message.message_id.clone(), message.clone());
        Ok(())
    }

    pub async fn messages_for_room(&self, room_id: &str) -> Result<Vec<ChatMessage>, AppError> {
        let mut messages: Vec<ChatMessage> = self
            .inner
            .chat_messages
            .iter()
            .filter(|entry| entry.value().room_id == room_id)
            .map(|entry| entry.value().clone())
            .collect();
        messages.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then_with(|| b.message_id.cmp(&a.message_id))
        });
        Ok(messages)
    }
}
