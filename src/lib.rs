// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Rehab-Tracker: Rehabilitation tracking for athletes and physiotherapists
//!
//! This crate provides the backend API connecting athletes with their
//! physiotherapists: exercise programs with countdown timers and feedback,
//! symptom logging, and chat with file and voice-note attachments.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Db;
use services::{ChatService, ExerciseService, IdentityService, MediaStore, SymptomLogService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Db,
    pub media: MediaStore,
    pub identity: IdentityService,
    pub exercises: ExerciseService,
    pub chat: ChatService,
    pub symptoms: SymptomLogService,
}
