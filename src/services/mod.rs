// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod chat;
pub mod exercise;
pub mod identity;
pub mod media;
pub mod symptoms;

pub use chat::ChatService;
pub use exercise::{ExerciseService, NewExercise, ReviewFilter};
pub use identity::IdentityService;
pub use media::{MediaStore, MediaUpload};
pub use symptoms::SymptomLogService;
