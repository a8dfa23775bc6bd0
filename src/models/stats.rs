// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! RPG stat block, stat increments and rank labels.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Starting value for every stat on a fresh profile.
pub const BASE_STAT: u32 = 10;

/// The four persisted stats of a hunter.
///
/// Stats only ever grow: they are changed exclusively through
/// [`StatBlock::apply`] with non-negative [`StatDeltas`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatBlock {
    pub strength: u32,
    pub endurance: u32,
    pub wisdom: u32,
    pub discipline: u32,
}

impl Default for StatBlock {
    fn default() -> Self {
        Self {
            strength: BASE_STAT,
            endurance: BASE_STAT,
            wisdom: BASE_STAT,
            discipline: BASE_STAT,
        }
    }
}

impl StatBlock {
    /// Add `deltas` to the current values.
    pub fn apply(&mut self, deltas: StatDeltas) {
        self.strength = self.strength.saturating_add(deltas.strength);
        self.endurance = self.endurance.saturating_add(deltas.endurance);
        self.wisdom = self.wisdom.saturating_add(deltas.wisdom);
        self.discipline = self.discipline.saturating_add(deltas.discipline);
    }
}

/// Additive stat increments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatDeltas {
    #[serde(default)]
    pub strength: u32,
    #[serde(default)]
    pub endurance: u32,
    #[serde(default)]
    pub wisdom: u32,
    #[serde(default)]
    pub discipline: u32,
}

impl StatDeltas {
    pub fn wisdom(points: u32) -> Self {
        Self {
            wisdom: points,
            ..Self::default()
        }
    }

    pub fn discipline(points: u32) -> Self {
        Self {
            discipline: points,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Hunter rank, ordered from lowest to highest.
///
/// Serialized as its display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum Rank {
    #[serde(rename = "E-Rank Human")]
    E,
    #[serde(rename = "D-Rank Trainee")]
    D,
    #[serde(rename = "C-Rank Warrior")]
    C,
    #[serde(rename = "B-Rank Hunter")]
    B,
    #[serde(rename = "A-Rank Hunter")]
    A,
    #[serde(rename = "S-Rank Hunter")]
    S,
}

impl Rank {
    pub fn label(&self) -> &'static str {
        match self {
            Rank::E => "E-Rank Human",
            Rank::D => "D-Rank Trainee",
            Rank::C => "C-Rank Warrior",
            Rank::B => "B-Rank Hunter",
            Rank::A => "A-Rank Hunter",
            Rank::S => "S-Rank Hunter",
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
