// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod chat;
pub mod exercise;
pub mod symptom;
pub mod user;

pub use chat::{ChatMessage, MessageKind};
pub use exercise::{Exercise, ExerciseSchedule, ExerciseStatus, ExerciseView};
pub use symptom::SymptomLog;
pub use user::{AthleteProfile, PhysioProfile, Role};
