// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Database layer.
//!
//! [`HunterStore`] is the persistence contract the services depend on.
//! [`FirestoreDb`] backs production; [`MemoryDb`] backs local development
//! and tests.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    Hunter, HunterIdentity, Meal, MessageRole, NewMeal, ProfileChanges, Quest, QuestProposal,
    QuestType, StatDeltas, SystemMessage, Workout, WorkoutRecord,
};
use crate::services::progression;
use crate::time_utils::now_secs;

/// Collection names as constants.
pub mod collections {
    pub const HUNTERS: &str = "hunters";
    pub const WORKOUTS: &str = "workouts";
    pub const QUESTS: &str = "quests";
    pub const MEALS: &str = "meals";
    pub const SYSTEM_MESSAGES: &str = "system_messages";
}

/// Largest generated document id; keeps ids exact as JSON numbers.
pub const MAX_DOCUMENT_ID: u64 = (1 << 53) - 1;

/// Persistence operations for hunters and everything they own.
///
/// Every mutation of XP or stats is an atomic read-modify-write on the
/// hunter document, so concurrent awards are never lost.
#[async_trait]
pub trait HunterStore: Send + Sync {
    // ─── Hunters ─────────────────────────────────────────────────

    async fn get_hunter(&self, id: &str) -> Result<Option<Hunter>>;

    async fn find_hunter_by_email(&self, email: &str) -> Result<Option<Hunter>>;

    /// Create the hunter if missing, otherwise refresh its identity fields.
    async fn upsert_hunter(&self, identity: &HunterIdentity) -> Result<Hunter>;

    /// Fails with `NotFound` if the hunter does not exist.
    async fn update_profile(&self, id: &str, changes: &ProfileChanges) -> Result<Hunter>;

    /// Add `gain` XP. Level and rank follow from the new total.
    async fn update_xp(&self, id: &str, gain: u64) -> Result<Hunter>;

    /// Add `deltas` to the hunter's stats.
    async fn update_stats(&self, id: &str, deltas: StatDeltas) -> Result<Hunter>;

    /// Remove the hunter and all owned records. Returns the number deleted.
    async fn delete_hunter_data(&self, id: &str) -> Result<usize>;

    /// Hunters ordered by XP, highest first.
    async fn leaderboard(&self, limit: usize) -> Result<Vec<Hunter>>;

    // ─── Workouts ────────────────────────────────────────────────

    /// Newest first. `since` is inclusive.
    async fn list_workouts(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Workout>>;

    /// Persist the workout and apply its XP and stat rewards to the owner
    /// as one atomic operation.
    async fn create_workout(
        &self,
        record: WorkoutRecord,
        stat_gain: StatDeltas,
    ) -> Result<(Workout, Hunter)>;

    // ─── Quests ──────────────────────────────────────────────────

    /// Newest first, optionally restricted to one type.
    async fn list_quests(&self, user_id: &str, quest_type: Option<QuestType>)
        -> Result<Vec<Quest>>;

    async fn get_quest(&self, quest_id: u64) -> Result<Option<Quest>>;

    /// Returns the number of quests removed.
    async fn delete_quests(&self, user_id: &str, quest_type: QuestType) -> Result<usize>;

    async fn create_quest(&self, user_id: &str, proposal: &QuestProposal) -> Result<Quest>;

    /// Conditional update `completed = true WHERE id = ? AND completed = false`.
    ///
    /// Returns the completed quest when this call performed the transition,
    /// `None` when the quest is missing or was already completed.
    async fn complete_quest_if_pending(&self, quest_id: u64) -> Result<Option<Quest>>;

    // ─── Meals ───────────────────────────────────────────────────

    /// Newest first; `range` is `[start, end)`.
    async fn list_meals(
        &self,
        user_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Meal>>;

    /// Persist the meal and apply `stat_gain` to its owner as one atomic
    /// operation. Fails with `NotFound` if the hunter does not exist.
    async fn create_meal(
        &self,
        user_id: &str,
        meal: NewMeal,
        stat_gain: StatDeltas,
    ) -> Result<(Meal, Hunter)>;

    // ─── System Messages ─────────────────────────────────────────

    /// The `limit` most recent messages, newest first.
    async fn list_messages(&self, user_id: &str, limit: usize) -> Result<Vec<SystemMessage>>;

    /// Append one chat exchange (the hunter's message, then the reply) and
    /// apply `stat_gain`, all or nothing.
    async fn record_exchange(
        &self,
        user_id: &str,
        message: &str,
        reply: &str,
        stat_gain: StatDeltas,
    ) -> Result<Hunter>;
}

/// The two transcript entries of one exchange. `ids` must be increasing so
/// the reply sorts after the message.
pub(crate) fn exchange_messages(
    user_id: &str,
    ids: [u64; 2],
    message: &str,
    reply: &str,
    created_at: DateTime<Utc>,
) -> [SystemMessage; 2] {
    let entry = |id: u64, role: MessageRole, content: &str| SystemMessage {
        id,
        user_id: user_id.to_string(),
        role,
        content: content.to_string(),
        created_at,
    };
    [
        entry(ids[0], MessageRole::User, message),
        entry(ids[1], MessageRole::Assistant, reply),
    ]
}

/// Apply an XP award and stat increments to an in-hand hunter.
///
/// Both backends call this inside their atomic section.
pub(crate) fn award(hunter: &mut Hunter, xp: u64, stats: StatDeltas) -> Result<()> {
    let gain = i64::try_from(xp).map_err(|_| progression::ProgressionError::Overflow)?;
    let progression = progression::apply_xp_gain(hunter.xp, gain)?;
    hunter.xp = progression.xp;
    hunter.stats.apply(stats);
    hunter.updated_at = now_secs();
    Ok(())
}

/// Refresh identity fields on an existing hunter. Absent names and image
/// keep their stored values.
pub(crate) fn refresh_identity(hunter: &mut Hunter, identity: &HunterIdentity) {
    if identity.email.is_some() {
        hunter.email = identity.email.clone();
    }
    if identity.first_name.is_some() {
        hunter.first_name = identity.first_name.clone();
    }
    if identity.last_name.is_some() {
        hunter.last_name = identity.last_name.clone();
    }
    if identity.profile_image_url.is_some() {
        hunter.profile_image_url = identity.profile_image_url.clone();
    }
    hunter.updated_at = now_secs();
}
