// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Quest lifecycle: batch regeneration and one-time completion.
//!
//! A quest moves `Pending → Completed` exactly once. The transition is a
//! conditional update in the store, so concurrent completions of the same
//! quest award its XP a single time.

use futures_util::{stream, StreamExt, TryStreamExt};
use std::sync::Arc;

use crate::db::HunterStore;
use crate::error::{AppError, Result};
use crate::models::{Cadence, CompletedQuest, Quest, QuestType};
use crate::services::quest_generator::QuestGenerator;

/// Quest writes in flight at once while storing a batch.
const MAX_CONCURRENT_WRITES: usize = 4;

pub struct QuestLifecycle {
    db: Arc<dyn HunterStore>,
    generator: QuestGenerator,
}

impl QuestLifecycle {
    pub fn new(db: Arc<dyn HunterStore>, generator: QuestGenerator) -> Self {
        Self { db, generator }
    }

    pub async fn list(&self, user_id: &str, quest_type: Option<QuestType>) -> Result<Vec<Quest>> {
        self.db.list_quests(user_id, quest_type).await
    }

    /// Replace the hunter's `cadence` quests with a freshly generated batch.
    pub async fn regenerate(
        &self,
        user_id: &str,
        cadence: Cadence,
        count: usize,
    ) -> Result<Vec<Quest>> {
        let hunter = self
            .db
            .get_hunter(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hunter {} not found", user_id)))?;

        let removed = self.db.delete_quests(user_id, cadence.quest_type()).await?;
        let proposals = self.generator.generate_quests(&hunter, cadence, count).await;

        let quests: Vec<Quest> = stream::iter(proposals)
            .map(|proposal| {
                let db = Arc::clone(&self.db);
                async move { db.create_quest(user_id, &proposal).await }
            })
            .buffered(MAX_CONCURRENT_WRITES)
            .try_collect()
            .await?;

        tracing::info!(
            user_id,
            cadence = cadence.as_str(),
            removed,
            created = quests.len(),
            "Regenerated quests"
        );
        Ok(quests)
    }

    /// Complete a pending quest owned by `user_id` and award its XP.
    ///
    /// Fails with `NotFound` for a missing or foreign quest and with
    /// `Conflict` if the quest was already completed.
    pub async fn complete(&self, user_id: &str, quest_id: u64) -> Result<CompletedQuest> {
        let not_found = || AppError::NotFound(format!("Quest {} not found", quest_id));

        self.db
            .get_quest(quest_id)
            .await?
            .filter(|quest| quest.user_id == user_id)
            .ok_or_else(not_found)?;

        let Some(quest) = self.db.complete_quest_if_pending(quest_id).await? else {
            // Lost the race: either another completion won, or the quest was
            // removed by a regeneration in between.
            return match self.db.get_quest(quest_id).await? {
                Some(_) => Err(AppError::Conflict("Quest already completed".to_string())),
                None => Err(not_found()),
            };
        };

        let hunter = self
            .db
            .update_xp(user_id, u64::from(quest.xp_reward))
            .await?;

        tracing::info!(
            user_id,
            quest_id,
            xp_reward = quest.xp_reward,
            total_xp = hunter.xp,
            "Quest completed"
        );

        Ok(CompletedQuest {
            quest,
            hunter: hunter.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use crate::models::{HunterIdentity, QuestProposal};
    use crate::services::generator::{GenerationError, GenerationRequest, TextGenerator};
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl TextGenerator for Offline {
        async fn generate(&self, _: &GenerationRequest) -> std::result::Result<String, GenerationError> {
            Err(GenerationError::Timeout)
        }
    }

    async fn setup() -> (Arc<MemoryDb>, QuestLifecycle) {
        let db = Arc::new(MemoryDb::new());
        db.upsert_hunter(&HunterIdentity {
            id: "hunter".to_string(),
            ..HunterIdentity::default()
        })
        .await
        .unwrap();
        let lifecycle = QuestLifecycle::new(db.clone(), QuestGenerator::new(Arc::new(Offline)));
        (db, lifecycle)
    }

    async fn special_quest(db: &MemoryDb, owner: &str, xp_reward: u32) -> Quest {
        db.create_quest(
            owner,
            &QuestProposal {
                title: "Gate Clear".to_string(),
                description: "Clear the gate.".to_string(),
                xp_reward,
                quest_type: QuestType::Special,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_complete_awards_once() {
        let (db, lifecycle) = setup().await;
        let quest = special_quest(&db, "hunter", 100).await;

        let completed = lifecycle.complete("hunter", quest.id).await.unwrap();
        assert!(completed.quest.completed);
        assert_eq!(completed.hunter.xp, 100);

        let err = lifecycle.complete("hunter", quest.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert_eq!(db.get_hunter("hunter").await.unwrap().unwrap().xp, 100);
    }

    #[tokio::test]
    async fn test_complete_foreign_or_missing_quest() {
        let (db, lifecycle) = setup().await;
        let quest = special_quest(&db, "someone-else", 100).await;

        let err = lifecycle.complete("hunter", quest.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(!db.get_quest(quest.id).await.unwrap().unwrap().completed);

        let err = lifecycle.complete("hunter", 424242).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_regenerate_replaces_batch_and_keeps_special() {
        let (db, lifecycle) = setup().await;
        let special = special_quest(&db, "hunter", 300).await;

        let first = lifecycle
            .regenerate("hunter", Cadence::Daily, 3)
            .await
            .unwrap();
        let second = lifecycle
            .regenerate("hunter", Cadence::Daily, 3)
            .await
            .unwrap();

        // Offline generator: one fallback quest per regeneration.
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].xp_reward, 50);

        let daily = lifecycle
            .list("hunter", Some(QuestType::Daily))
            .await
            .unwrap();
        assert_eq!(daily.len(), 1);
        assert_eq!(daily[0].id, second[0].id);
        assert!(db.get_quest(special.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_regenerate_unknown_hunter() {
        let (_, lifecycle) = setup().await;
        let err = lifecycle
            .regenerate("nobody", Cadence::Weekly, 2)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
