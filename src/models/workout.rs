// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::models::hunter::HunterResponse;
use crate::time_utils::rfc3339_secs;

/// Stored workout record. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Workout {
    /// Document ID
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    /// Owning hunter
    pub user_id: String,
    /// When the session took place
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
    /// Σ weight × reps over every set (kg)
    pub total_volume: f64,
    pub duration_minutes: u32,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    /// XP awarded when the workout was logged
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub xp_gained: u64,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

/// One exercise with its ordered sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Exercise {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 50), nested)]
    pub sets: Vec<WorkoutSet>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutSet {
    /// Load in kilograms
    #[validate(range(min = 0.0, max = 1000.0))]
    pub weight: f64,
    #[validate(range(max = 1000))]
    pub reps: u32,
}

impl Exercise {
    pub fn volume(&self) -> f64 {
        self.sets
            .iter()
            .map(|set| set.weight * f64::from(set.reps))
            .sum()
    }
}

/// Sum of weight × reps across every set of every exercise.
pub fn total_volume(exercises: &[Exercise]) -> f64 {
    exercises.iter().map(Exercise::volume).sum()
}

/// `POST /api/workouts` request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewWorkout {
    /// Defaults to now
    #[serde(default, with = "crate::time_utils::rfc3339_secs_option")]
    pub date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 30), nested)]
    pub exercises: Vec<Exercise>,
    #[validate(range(max = 1440))]
    pub duration_minutes: u32,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(url)]
    pub photo_url: Option<String>,
}

/// Workout fields the store persists; the store assigns `id`.
#[derive(Debug, Clone)]
pub struct WorkoutRecord {
    pub user_id: String,
    pub date: DateTime<Utc>,
    pub exercises: Vec<Exercise>,
    pub total_volume: f64,
    pub duration_minutes: u32,
    pub notes: Option<String>,
    pub photo_url: Option<String>,
    pub xp_gained: u64,
}

impl WorkoutRecord {
    pub fn into_workout(self, id: u64, created_at: DateTime<Utc>) -> Workout {
        Workout {
            id,
            user_id: self.user_id,
            date: self.date,
            exercises: self.exercises,
            total_volume: self.total_volume,
            duration_minutes: self.duration_minutes,
            notes: self.notes,
            photo_url: self.photo_url,
            xp_gained: self.xp_gained,
            created_at,
        }
    }
}

/// Feedback computed when a workout is logged.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WorkoutAnalysis {
    pub progressive_overload: bool,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub xp_gained: u64,
    pub message: String,
    pub this_week_volume: f64,
    pub last_week_volume: f64,
    pub strength_gain: u32,
    pub endurance_gain: u32,
}

/// Response of `POST /api/workouts`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoggedWorkout {
    pub workout: Workout,
    pub analysis: WorkoutAnalysis,
    pub hunter: HunterResponse,
}
