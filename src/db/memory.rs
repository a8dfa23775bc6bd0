// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local development and tests.
//!
//! Conditional updates run while holding the DashMap shard lock of the
//! affected entry, which gives them the same atomicity as the Firestore
//! transactions in [`super::firestore`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{award, exchange_messages, HunterStore};
use crate::error::{AppError, Result};
use crate::models::{
    Hunter, HunterIdentity, Meal, NewMeal, ProfileChanges, Quest, QuestProposal, QuestType,
    StatDeltas, SystemMessage, Workout, WorkoutRecord,
};
use crate::time_utils::now_secs;

/// DashMap-backed [`HunterStore`].
#[derive(Default)]
pub struct MemoryDb {
    hunters: DashMap<String, Hunter>,
    workouts: DashMap<u64, Workout>,
    quests: DashMap<u64, Quest>,
    meals: DashMap<u64, Meal>,
    messages: DashMap<u64, SystemMessage>,
    next_id: AtomicU64,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ids increase monotonically, so they double as insertion order.
    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

fn hunter_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Hunter {} not found", id))
}

#[async_trait]
impl HunterStore for MemoryDb {
    async fn get_hunter(&self, id: &str) -> Result<Option<Hunter>> {
        Ok(self.hunters.get(id).map(|h| h.value().clone()))
    }

    async fn find_hunter_by_email(&self, email: &str) -> Result<Option<Hunter>> {
        Ok(self
            .hunters
            .iter()
            .find(|h| h.email.as_deref() == Some(email))
            .map(|h| h.value().clone()))
    }

    async fn upsert_hunter(&self, identity: &HunterIdentity) -> Result<Hunter> {
        let hunter = match self.hunters.entry(identity.id.clone()) {
            Entry::Occupied(mut entry) => {
                let hunter = entry.get_mut();
                super::refresh_identity(hunter, identity);
                hunter.clone()
            }
            Entry::Vacant(entry) => entry.insert(Hunter::new(identity)).value().clone(),
        };
        Ok(hunter)
    }

    async fn update_profile(&self, id: &str, changes: &ProfileChanges) -> Result<Hunter> {
        let mut hunter = self.hunters.get_mut(id).ok_or_else(|| hunter_not_found(id))?;
        changes.apply_to(hunter.value_mut());
        Ok(hunter.value().clone())
    }

    async fn update_xp(&self, id: &str, gain: u64) -> Result<Hunter> {
        let mut hunter = self.hunters.get_mut(id).ok_or_else(|| hunter_not_found(id))?;
        award(hunter.value_mut(), gain, StatDeltas::default())?;
        Ok(hunter.value().clone())
    }

    async fn update_stats(&self, id: &str, deltas: StatDeltas) -> Result<Hunter> {
        let mut hunter = self.hunters.get_mut(id).ok_or_else(|| hunter_not_found(id))?;
        award(hunter.value_mut(), 0, deltas)?;
        Ok(hunter.value().clone())
    }

    async fn delete_hunter_data(&self, id: &str) -> Result<usize> {
        let mut deleted = 0usize;
        self.quests.retain(|_, q| {
            let keep = q.user_id != id;
            deleted += usize::from(!keep);
            keep
        });
        self.workouts.retain(|_, w| {
            let keep = w.user_id != id;
            deleted += usize::from(!keep);
            keep
        });
        self.meals.retain(|_, m| {
            let keep = m.user_id != id;
            deleted += usize::from(!keep);
            keep
        });
        self.messages.retain(|_, m| {
            let keep = m.user_id != id;
            deleted += usize::from(!keep);
            keep
        });
        if self.hunters.remove(id).is_some() {
            deleted += 1;
        }

        tracing::info!(user_id = id, deleted, "Hunter data deletion complete");
        Ok(deleted)
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<Hunter>> {
        let mut hunters: Vec<Hunter> = self.hunters.iter().map(|h| h.value().clone()).collect();
        hunters.sort_by(|a, b| b.xp.cmp(&a.xp).then_with(|| a.id.cmp(&b.id)));
        hunters.truncate(limit);
        Ok(hunters)
    }

    async fn list_workouts(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Workout>> {
        let mut workouts: Vec<Workout> = self
            .workouts
            .iter()
            .filter(|w| w.user_id == user_id)
            .filter(|w| since.map_or(true, |since| w.date >= since))
            .map(|w| w.value().clone())
            .collect();
        workouts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        if let Some(limit) = limit {
            workouts.truncate(limit);
        }
        Ok(workouts)
    }

    async fn create_workout(
        &self,
        record: WorkoutRecord,
        stat_gain: StatDeltas,
    ) -> Result<(Workout, Hunter)> {
        // Hold the owner's entry for the whole operation: either both the
        // workout and its rewards land, or neither does.
        let mut hunter = self
            .hunters
            .get_mut(&record.user_id)
            .ok_or_else(|| hunter_not_found(&record.user_id))?;
        award(hunter.value_mut(), record.xp_gained, stat_gain)?;

        let workout = record.into_workout(self.allocate_id(), now_secs());
        self.workouts.insert(workout.id, workout.clone());

        Ok((workout, hunter.value().clone()))
    }

    async fn list_quests(
        &self,
        user_id: &str,
        quest_type: Option<QuestType>,
    ) -> Result<Vec<Quest>> {
        let mut quests: Vec<Quest> = self
            .quests
            .iter()
            .filter(|q| q.user_id == user_id)
            .filter(|q| quest_type.map_or(true, |t| q.quest_type == t))
            .map(|q| q.value().clone())
            .collect();
        quests.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(quests)
    }

    async fn get_quest(&self, quest_id: u64) -> Result<Option<Quest>> {
        Ok(self.quests.get(&quest_id).map(|q| q.value().clone()))
    }

    async fn delete_quests(&self, user_id: &str, quest_type: QuestType) -> Result<usize> {
        let mut deleted = 0usize;
        self.quests.retain(|_, q| {
            let keep = !(q.user_id == user_id && q.quest_type == quest_type);
            deleted += usize::from(!keep);
            keep
        });
        Ok(deleted)
    }

    async fn create_quest(&self, user_id: &str, proposal: &QuestProposal) -> Result<Quest> {
        let quest = proposal
            .clone()
            .into_quest(self.allocate_id(), user_id, now_secs());
        self.quests.insert(quest.id, quest.clone());
        Ok(quest)
    }

    async fn complete_quest_if_pending(&self, quest_id: u64) -> Result<Option<Quest>> {
        let Some(mut quest) = self.quests.get_mut(&quest_id) else {
            return Ok(None);
        };
        if quest.value_mut().mark_completed(now_secs()) {
            Ok(Some(quest.value().clone()))
        } else {
            Ok(None)
        }
    }

    async fn list_meals(
        &self,
        user_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Meal>> {
        let mut meals: Vec<Meal> = self
            .meals
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter(|m| range.map_or(true, |(start, end)| m.date >= start && m.date < end))
            .map(|m| m.value().clone())
            .collect();
        meals.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        Ok(meals)
    }

    async fn create_meal(
        &self,
        user_id: &str,
        meal: NewMeal,
        stat_gain: StatDeltas,
    ) -> Result<(Meal, Hunter)> {
        let mut hunter = self
            .hunters
            .get_mut(user_id)
            .ok_or_else(|| hunter_not_found(user_id))?;
        award(hunter.value_mut(), 0, stat_gain)?;

        let meal = meal.into_meal(self.allocate_id(), user_id, now_secs());
        self.meals.insert(meal.id, meal.clone());

        Ok((meal, hunter.value().clone()))
    }

    async fn list_messages(&self, user_id: &str, limit: usize) -> Result<Vec<SystemMessage>> {
        let mut messages: Vec<SystemMessage> = self
            .messages
            .iter()
            .filter(|m| m.user_id == user_id)
            .map(|m| m.value().clone())
            .collect();
        messages.sort_by(|a, b| b.id.cmp(&a.id));
        messages.truncate(limit);
        Ok(messages)
    }

    async fn record_exchange(
        &self,
        user_id: &str,
        message: &str,
        reply: &str,
        stat_gain: StatDeltas,
    ) -> Result<Hunter> {
        let mut hunter = self
            .hunters
            .get_mut(user_id)
            .ok_or_else(|| hunter_not_found(user_id))?;
        award(hunter.value_mut(), 0, stat_gain)?;

        let ids = [self.allocate_id(), self.allocate_id()];
        for entry in exchange_messages(user_id, ids, message, reply, now_secs()) {
            self.messages.insert(entry.id, entry);
        }

        Ok(hunter.value().clone())
    }
}
