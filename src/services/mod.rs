// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod chat;
pub mod generator;
pub mod groq;
pub mod profile;
pub mod progression;
pub mod quest_generator;
pub mod quests;
pub mod volume;
pub mod workouts;

pub use chat::SystemChat;
pub use generator::{GenerationError, GenerationRequest, TextGenerator};
pub use groq::GroqClient;
pub use profile::ProfileService;
pub use quest_generator::QuestGenerator;
pub use quests::QuestLifecycle;
pub use workouts::WorkoutService;
