// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod hunter;
pub mod meal;
pub mod message;
pub mod quest;
pub mod stats;
pub mod workout;

pub use hunter::{Hunter, HunterIdentity, HunterResponse, ProfileChanges};
pub use meal::{Meal, NewMeal};
pub use message::{ChatPayload, ChatReply, MessageRole, SystemMessage};
pub use quest::{Cadence, CompletedQuest, Quest, QuestProposal, QuestStatus, QuestType};
pub use stats::{Rank, StatBlock, StatDeltas};
pub use workout::{Exercise, NewWorkout, Workout, WorkoutRecord, WorkoutSet};
