// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Quest model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::hunter::HunterResponse;
use crate::time_utils::{rfc3339_secs, rfc3339_secs_option};

/// Quest category. `Daily` and `Weekly` are regenerated wholesale;
/// `Special` quests are never removed automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum QuestType {
    Daily,
    Weekly,
    Special,
}

impl QuestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestType::Daily => "daily",
            QuestType::Weekly => "weekly",
            QuestType::Special => "special",
        }
    }
}

impl FromStr for QuestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(QuestType::Daily),
            "weekly" => Ok(QuestType::Weekly),
            "special" => Ok(QuestType::Special),
            other => Err(format!(
                "Invalid quest type '{}'. Must be 'daily', 'weekly', or 'special'.",
                other
            )),
        }
    }
}

impl std::fmt::Display for QuestType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Refresh period of generated quests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Daily,
    Weekly,
}

impl Cadence {
    /// Inclusive XP reward range requested from (and enforced on) the provider.
    pub fn xp_range(&self) -> (u32, u32) {
        match self {
            Cadence::Daily => (50, 200),
            Cadence::Weekly => (250, 500),
        }
    }

    /// Number of quests generated per refresh.
    pub fn default_count(&self) -> usize {
        match self {
            Cadence::Daily => 3,
            Cadence::Weekly => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.quest_type().as_str()
    }

    pub fn quest_type(&self) -> QuestType {
        match self {
            Cadence::Daily => QuestType::Daily,
            Cadence::Weekly => QuestType::Weekly,
        }
    }
}

impl From<Cadence> for QuestType {
    fn from(cadence: Cadence) -> Self {
        cadence.quest_type()
    }
}

impl FromStr for Cadence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Cadence::Daily),
            "weekly" => Ok(Cadence::Weekly),
            other => Err(format!(
                "Invalid quest cadence '{}'. Must be 'daily' or 'weekly'.",
                other
            )),
        }
    }
}

/// Lifecycle state. `Pending → Completed` is the only transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuestStatus {
    Pending,
    Completed,
}

/// Stored quest record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Quest {
    /// Document ID
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    /// Owning hunter
    pub user_id: String,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
    pub title: String,
    pub description: String,
    pub xp_reward: u32,
    #[serde(default)]
    pub gold_reward: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, with = "rfc3339_secs_option")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string | null"))]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

impl Quest {
    pub fn status(&self) -> QuestStatus {
        if self.completed {
            QuestStatus::Completed
        } else {
            QuestStatus::Pending
        }
    }

    /// Pending → Completed. Returns `false` (and changes nothing) if the
    /// quest was already completed.
    pub fn mark_completed(&mut self, at: DateTime<Utc>) -> bool {
        match self.status() {
            QuestStatus::Completed => false,
            QuestStatus::Pending => {
                self.completed = true;
                self.completed_at = Some(at);
                true
            }
        }
    }
}

/// A quest before it is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestProposal {
    pub title: String,
    pub description: String,
    pub xp_reward: u32,
    #[serde(rename = "type")]
    pub quest_type: QuestType,
}

impl QuestProposal {
    pub fn into_quest(self, id: u64, user_id: &str, created_at: DateTime<Utc>) -> Quest {
        Quest {
            id,
            user_id: user_id.to_string(),
            quest_type: self.quest_type,
            title: self.title,
            description: self.description,
            xp_reward: self.xp_reward,
            gold_reward: 0,
            completed: false,
            completed_at: None,
            created_at,
        }
    }
}

/// Response of `PATCH /api/quests/{id}/complete`.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompletedQuest {
    pub quest: Quest,
    pub hunter: HunterResponse,
}
