// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Progression rules: XP → level → rank, and workout → XP/stat rewards.
//!
//! Level and rank are never stored. They are recomputed from XP wherever they
//! are needed, so they cannot drift out of sync with it.

use crate::models::stats::{Rank, StatDeltas};
use serde::Serialize;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// XP granted for logging any workout.
pub const BASE_WORKOUT_XP: u64 = 50;
/// Kilograms of volume per bonus XP point.
const VOLUME_PER_XP: f64 = 100.0;
/// Kilograms of volume per strength point.
const VOLUME_PER_STRENGTH: f64 = 2000.0;
/// Minutes of training per endurance point.
const MINUTES_PER_ENDURANCE: i64 = 30;
/// XP scale of the level curve: level L starts at `XP_SCALE * (L-1)^2`.
const XP_SCALE: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    #[error("XP gain must not be negative (got {0})")]
    NegativeGain(i64),

    #[error("XP total overflow")]
    Overflow,
}

/// XP together with the level and rank derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progression {
    pub xp: u64,
    pub level: u32,
    pub rank: Rank,
}

impl Progression {
    pub fn from_xp(xp: u64) -> Self {
        let level = level_from_xp(xp);
        Self {
            xp,
            level,
            rank: rank_from_level(level),
        }
    }
}

/// Position inside the current level, for progress bars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LevelProgress {
    pub level: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub current_level_xp: u64,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub next_level_xp: u64,
    pub percent: f64,
}

/// `floor(sqrt(xp / 100)) + 1`, using exact integer arithmetic.
pub fn level_from_xp(xp: u64) -> u32 {
    let root = isqrt(xp / XP_SCALE);
    u32::try_from(root).unwrap_or(u32::MAX - 1) + 1
}

/// Minimum XP of `level` (`100 * (level - 1)^2`).
pub fn xp_for_level(level: u32) -> u64 {
    let steps = u64::from(level.saturating_sub(1));
    XP_SCALE.saturating_mul(steps.saturating_mul(steps))
}

/// Step function over level; thresholds are inclusive lower bounds.
pub fn rank_from_level(level: u32) -> Rank {
    match level {
        20.. => Rank::S,
        15.. => Rank::A,
        12.. => Rank::B,
        10.. => Rank::C,
        5.. => Rank::D,
        _ => Rank::E,
    }
}

/// Add `gain` XP to `current_xp` and re-derive level and rank.
pub fn apply_xp_gain(current_xp: u64, gain: i64) -> Result<Progression, ProgressionError> {
    let gain = u64::try_from(gain).map_err(|_| ProgressionError::NegativeGain(gain))?;
    let xp = current_xp
        .checked_add(gain)
        .ok_or(ProgressionError::Overflow)?;
    Ok(Progression::from_xp(xp))
}

/// Strength from volume, endurance from duration.
pub fn stat_delta_from_workout(total_volume: f64, duration_minutes: i64) -> StatDeltas {
    let strength = if total_volume.is_finite() && total_volume > 0.0 {
        (total_volume / VOLUME_PER_STRENGTH).floor() as u32
    } else {
        0
    };
    let endurance = if duration_minutes > 0 {
        u32::try_from(duration_minutes / MINUTES_PER_ENDURANCE).unwrap_or(u32::MAX)
    } else {
        0
    };

    StatDeltas {
        strength,
        endurance,
        ..StatDeltas::default()
    }
}

/// `50 + floor(volume / 100)`.
pub fn xp_from_workout(total_volume: f64) -> u64 {
    let bonus = if total_volume.is_finite() && total_volume > 0.0 {
        (total_volume / VOLUME_PER_XP).floor() as u64
    } else {
        0
    };
    BASE_WORKOUT_XP.saturating_add(bonus)
}

pub fn level_progress(xp: u64) -> LevelProgress {
    let level = level_from_xp(xp);
    let current_level_xp = xp_for_level(level);
    let next_level_xp = xp_for_level(level.saturating_add(1));
    let span = next_level_xp.saturating_sub(current_level_xp);

    let percent = if span > 0 {
        let into_level = xp.saturating_sub(current_level_xp) as f64;
        (into_level / span as f64 * 100.0).clamp(0.0, 100.0)
    } else {
        0.0
    };

    LevelProgress {
        level,
        current_level_xp,
        next_level_xp,
        percent,
    }
}

fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    // Float estimate, then correct the rounding error in either direction.
    let mut root = (n as f64).sqrt() as u64;
    while root.checked_mul(root).map_or(true, |sq| sq > n) {
        root -= 1;
    }
    while (root + 1).checked_mul(root + 1).is_some_and(|sq| sq <= n) {
        root += 1;
    }
    root
}
