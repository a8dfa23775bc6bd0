// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hunter (user profile) model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::models::stats::{Rank, StatBlock};
use crate::services::progression::{self, LevelProgress, Progression};
use crate::time_utils::{now_secs, rfc3339_secs};

/// Minimum level before a character class can be chosen.
pub const CLASS_UNLOCK_LEVEL: u32 = 10;

/// Hunter profile stored in the `hunters` collection.
///
/// Only `xp` is persisted; level and rank are derived on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hunter {
    /// Auth subject (also used as document ID)
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    #[serde(with = "rfc3339_secs")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "rfc3339_secs")]
    pub updated_at: DateTime<Utc>,

    // ─── Fitness Profile ─────────────────────────────────────────
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height_cm: Option<u32>,
    pub weight_kg: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    /// Beginner, Intermediate, Advanced
    pub fitness_level: Option<String>,
    /// Muscle Gain, Fat Loss, Recomposition
    pub fitness_goal: Option<String>,
    pub fat_level: Option<FatLevel>,

    // ─── Progression ─────────────────────────────────────────────
    #[serde(default)]
    pub xp: u64,
    /// Unlocked at level 10, chosen once
    pub character_class: Option<String>,
    #[serde(default)]
    pub stats: StatBlock,

    #[serde(default)]
    pub onboarding_completed: bool,
}

impl Hunter {
    /// A fresh level-1 profile for an authenticated identity.
    pub fn new(identity: &HunterIdentity) -> Self {
        let now = now_secs();
        Self {
            id: identity.id.clone(),
            email: identity.email.clone(),
            first_name: identity.first_name.clone(),
            last_name: identity.last_name.clone(),
            profile_image_url: identity.profile_image_url.clone(),
            created_at: now,
            updated_at: now,
            age: None,
            gender: None,
            height_cm: None,
            weight_kg: None,
            body_fat_percentage: None,
            fitness_level: None,
            fitness_goal: None,
            fat_level: None,
            xp: 0,
            character_class: None,
            stats: StatBlock::default(),
            onboarding_completed: false,
        }
    }

    pub fn progression(&self) -> Progression {
        Progression::from_xp(self.xp)
    }

    pub fn level(&self) -> u32 {
        progression::level_from_xp(self.xp)
    }

    pub fn rank(&self) -> Rank {
        progression::rank_from_level(self.level())
    }
}

/// Identity fields supplied by the auth provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HunterIdentity {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Body-fat band derived from `body_fat_percentage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum FatLevel {
    #[serde(rename = "Very Low")]
    VeryLow,
    Low,
    Average,
    #[serde(rename = "Slightly Obese")]
    SlightlyObese,
    Obese,
}

impl FatLevel {
    pub fn from_body_fat(percentage: f64) -> Self {
        if percentage < 10.0 {
            FatLevel::VeryLow
        } else if percentage < 15.0 {
            FatLevel::Low
        } else if percentage < 25.0 {
            FatLevel::Average
        } else if percentage < 35.0 {
            FatLevel::SlightlyObese
        } else {
            FatLevel::Obese
        }
    }
}

/// Partial profile change applied by the store.
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height_cm: Option<u32>,
    pub weight_kg: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub fitness_level: Option<String>,
    pub fitness_goal: Option<String>,
    pub fat_level: Option<FatLevel>,
    pub character_class: Option<String>,
    pub onboarding_completed: Option<bool>,
}

impl ProfileChanges {
    /// Apply onto `hunter`.
    ///
    /// A character class is only written while none is set, and onboarding
    /// never reverts to incomplete.
    pub fn apply_to(&self, hunter: &mut Hunter) {
        fn set<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *target = Some(v.clone());
            }
        }

        set(&mut hunter.first_name, &self.first_name);
        set(&mut hunter.last_name, &self.last_name);
        set(&mut hunter.profile_image_url, &self.profile_image_url);
        set(&mut hunter.age, &self.age);
        set(&mut hunter.gender, &self.gender);
        set(&mut hunter.height_cm, &self.height_cm);
        set(&mut hunter.weight_kg, &self.weight_kg);
        set(&mut hunter.body_fat_percentage, &self.body_fat_percentage);
        set(&mut hunter.fitness_level, &self.fitness_level);
        set(&mut hunter.fitness_goal, &self.fitness_goal);
        set(&mut hunter.fat_level, &self.fat_level);

        if hunter.character_class.is_none() {
            set(&mut hunter.character_class, &self.character_class);
        }
        if self.onboarding_completed == Some(true) {
            hunter.onboarding_completed = true;
        }

        hunter.updated_at = now_secs();
    }
}

/// `PATCH /api/profile` request body.
///
/// The route distinguishes three shapes: avatar only, class only, or a full
/// onboarding/profile form (see `services::profile`).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfilePatch {
    #[validate(length(min = 1, max = 100, message = "Name is a required field."))]
    pub first_name: Option<String>,
    #[validate(length(max = 100))]
    pub last_name: Option<String>,
    #[validate(url(message = "Invalid image URL."))]
    pub profile_image_url: Option<String>,
    #[validate(range(min = 13, max = 120))]
    pub age: Option<u32>,
    #[validate(length(max = 32))]
    pub gender: Option<String>,
    #[validate(range(min = 100, max = 250))]
    pub height_cm: Option<u32>,
    #[validate(range(min = 30.0, max = 300.0))]
    pub weight_kg: Option<f64>,
    #[validate(range(min = 2.0, max = 70.0))]
    pub body_fat_percentage: Option<f64>,
    #[validate(length(max = 32))]
    pub fitness_level: Option<String>,
    #[validate(length(max = 64))]
    pub fitness_goal: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub character_class: Option<String>,
    pub onboarding_completed: Option<bool>,
}

/// Hunter as returned by the API, with derived progression.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct HunterResponse {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub height_cm: Option<u32>,
    pub weight_kg: Option<f64>,
    pub body_fat_percentage: Option<f64>,
    pub fitness_level: Option<String>,
    pub fitness_goal: Option<String>,
    pub fat_level: Option<FatLevel>,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub xp: u64,
    pub level: u32,
    pub rank: Rank,
    pub progress: LevelProgress,
    pub character_class: Option<String>,
    pub stats: StatBlock,
    pub onboarding_completed: bool,
    pub created_at: String,
}

impl From<Hunter> for HunterResponse {
    fn from(hunter: Hunter) -> Self {
        let progression = hunter.progression();
        Self {
            progress: progression::level_progress(hunter.xp),
            xp: progression.xp,
            level: progression.level,
            rank: progression.rank,
            created_at: crate::time_utils::format_utc_rfc3339(hunter.created_at),
            id: hunter.id,
            email: hunter.email,
            first_name: hunter.first_name,
            last_name: hunter.last_name,
            profile_image_url: hunter.profile_image_url,
            age: hunter.age,
            gender: hunter.gender,
            height_cm: hunter.height_cm,
            weight_kg: hunter.weight_kg,
            body_fat_percentage: hunter.body_fat_percentage,
            fitness_level: hunter.fitness_level,
            fitness_goal: hunter.fitness_goal,
            fat_level: hunter.fat_level,
            character_class: hunter.character_class,
            stats: hunter.stats,
            onboarding_completed: hunter.onboarding_completed,
        }
    }
}
