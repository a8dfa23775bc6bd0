// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hunter System API Server
//!
//! Gamified fitness tracking: workouts earn XP and stats, hunters level up
//! through ranks and take quests from "The System".

use hunter_system::{
    config::{Config, StorageBackend},
    db::{FirestoreDb, HunterStore, MemoryDb},
    services::{GroqClient, TextGenerator},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Hunter System API");

    let db: Arc<dyn HunterStore> = match config.storage_backend {
        StorageBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data will not survive a restart");
            Arc::new(MemoryDb::new())
        }
    };

    let generator: Arc<dyn TextGenerator> = Arc::new(GroqClient::new(&config));
    tracing::info!(
        quest_model = %config.quest_model,
        chat_model = %config.chat_model,
        "Text generation client initialized"
    );

    let state = Arc::new(AppState::new(config.clone(), db, generator));
    let app = hunter_system::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), tracing_subscriber::filter::ParseError> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("hunter_system=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
