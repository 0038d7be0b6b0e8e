// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Rehab-Tracker API Server
//!
//! Connects athletes with their physiotherapists: exercise programs with
//! countdown timers, symptom logging, and chat with media attachments.

use rehab_tracker::{
    config::Config,
    db::Db,
    services::{ChatService, ExerciseService, IdentityService, MediaStore, SymptomLogService},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Rehab-Tracker API");

    // Initialize Firestore database
    let db = Db::connect(&config.gcp_project_id)
        .await
        .expect("Failed to connect to Firestore");

    // Initialize media storage
    let media = MediaStore::connect(&config.media_bucket)
        .await
        .expect("Failed to initialize media storage");
    tracing::info!(bucket = %config.media_bucket, "Media storage initialized");

    // Initialize the identity provider client
    let identity = IdentityService::new(config.identity_api_key.clone());

    // Business services share the database and media handles
    let exercises = ExerciseService::new(db.clone(), media.clone());
    let chat = ChatService::new(db.clone(), media.clone());
    let symptoms = SymptomLogService::new(db.clone(), media.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        media,
        identity,
        exercises,
        chat,
        symptoms,
    });

    // Build router
    let app = rehab_tracker::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rehab_tracker=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
