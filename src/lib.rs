// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hunter System: a gamified fitness tracker backend.
//!
//! Hunters log workouts, earn XP and stats, level up through ranks,
//! complete AI-generated quests and talk to "The System", an AI persona.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::HunterStore;
use services::{
    ProfileService, QuestGenerator, QuestLifecycle, SystemChat, TextGenerator, WorkoutService,
};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn HunterStore>,
    pub quests: Arc<QuestLifecycle>,
    pub profiles: ProfileService,
    pub workouts: WorkoutService,
    pub chat: SystemChat,
}

impl AppState {
    /// Wire the services on top of a store and a text generator.
    pub fn new(
        config: Config,
        db: Arc<dyn HunterStore>,
        generator: Arc<dyn TextGenerator>,
    ) -> Self {
        let quests = Arc::new(QuestLifecycle::new(
            db.clone(),
            QuestGenerator::new(generator.clone()),
        ));

        Self {
            profiles: ProfileService::new(db.clone(), quests.clone()),
            workouts: WorkoutService::new(db.clone()),
            chat: SystemChat::new(db.clone(), generator),
            quests,
            db,
            config,
        }
    }
}
