// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper implementing [`HunterStore`].
//!
//! Layout:
//! - `hunters/{auth subject}`
//! - `workouts/{id}`, `quests/{id}`, `meals/{id}`, `system_messages/{id}`,
//!   each carrying the owner's `user_id`
//!
//! Every change to a hunter's XP or stats, and the quest completion
//! transition, runs as a read-modify-write inside a Firestore transaction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::db::{
    award, collections, exchange_messages, refresh_identity, HunterStore, MAX_DOCUMENT_ID,
};
use crate::error::AppError;
use crate::models::{
    Hunter, HunterIdentity, Meal, NewMeal, ProfileChanges, Quest, QuestProposal, QuestType,
    StatDeltas, SystemMessage, Workout, WorkoutRecord,
};
use crate::time_utils::{format_utc_rfc3339, now_secs};

// Firestore limits batch/transaction writes to 500 operations.
// We use a safe limit of 400 to allow headroom.
const BATCH_SIZE: usize = 400;
/// Commit attempts before a contended transaction gives up.
const MAX_TRANSACTION_ATTEMPTS: usize = 5;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Start of the id clock (2024-01-01T00:00:00Z, in milliseconds).
const ID_EPOCH_MILLIS: i64 = 1_704_067_200_000;
/// Random low bits of each document id.
const ID_RANDOM_BITS: u32 = 12;
/// Attempts to create a document before giving up on id collisions.
const MAX_INSERT_ATTEMPTS: usize = 5;

/// Last id handed out by this process.
static LAST_DOCUMENT_ID: AtomicU64 = AtomicU64::new(0);

/// New document id: milliseconds since [`ID_EPOCH_MILLIS`] shifted left
/// [`ID_RANDOM_BITS`], with random low bits.
///
/// Ids sort in creation order, stay below 2^53 until 2093 and are strictly
/// increasing within a process. Writes across processes can still collide,
/// so every document is created with a must-not-exist condition.
fn new_document_id() -> u64 {
    let millis = u64::try_from(Utc::now().timestamp_millis() - ID_EPOCH_MILLIS).unwrap_or_default();
    let salt: u64 = rand::thread_rng().gen_range(0..(1 << ID_RANDOM_BITS));
    let candidate = ((millis << ID_RANDOM_BITS) | salt) & MAX_DOCUMENT_ID;

    let next = |last: u64| candidate.max(last.saturating_add(1));
    match LAST_DOCUMENT_ID.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(next(last))) {
        Ok(last) | Err(last) => next(last),
    }
}

fn hunter_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Hunter {} not found", id))
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. Every operation fails with a database error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Helper Methods ────────────────────────────────────────────

    /// Transactional read-modify-write of one document.
    ///
    /// `modify` receives the current document (read inside the transaction)
    /// and returns the document to write back, or `None` to write nothing,
    /// plus the value to return. It may add further writes to the
    /// transaction. Commit conflicts re-run `modify` on fresh data.
    async fn transact<D, T, F>(
        &self,
        collection: &'static str,
        doc_id: &str,
        mut modify: F,
    ) -> Result<T, AppError>
    where
        D: Serialize + DeserializeOwned + Send + Sync,
        F: FnMut(Option<D>, &mut firestore::FirestoreTransaction<'_>) -> Result<(Option<D>, T), AppError>,
    {
        let client = self.get_client()?;

        for attempt in 1..=MAX_TRANSACTION_ATTEMPTS {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            // Reads through this handle are registered with the transaction.
            let tx_client = client.clone_with_consistency_selector(
                firestore::FirestoreConsistencySelector::Transaction(
                    transaction.transaction_id().clone(),
                ),
            );

            let current: Option<D> = match tx_client
                .fluent()
                .select()
                .by_id_in(collection)
                .obj()
                .one(doc_id)
                .await
            {
                Ok(current) => current,
                Err(e) => {
                    let _ = transaction.rollback().await;
                    return Err(AppError::Database(format!(
                        "Failed to read {} in transaction: {}",
                        collection, e
                    )));
                }
            };

            let (updated, result) = match modify(current, &mut transaction) {
                Ok(outcome) => outcome,
                Err(e) => {
                    let _ = transaction.rollback().await;
                    return Err(e);
                }
            };

            let Some(updated) = updated else {
                let _ = transaction.rollback().await;
                return Ok(result);
            };

            client
                .fluent()
                .update()
                .in_col(collection)
                .document_id(doc_id)
                .object(&updated)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add {} write to transaction: {}",
                        collection, e
                    ))
                })?;

            match transaction.commit().await {
                Ok(_) => return Ok(result),
                Err(e) if attempt < MAX_TRANSACTION_ATTEMPTS => {
                    tracing::warn!(
                        collection,
                        doc_id,
                        attempt,
                        error = %e,
                        "Transaction commit failed, retrying"
                    );
                }
                Err(e) => {
                    return Err(AppError::Database(format!(
                        "Transaction commit failed: {}",
                        e
                    )))
                }
            }
        }

        Err(AppError::Database(format!(
            "Transaction on {} gave up after {} attempts",
            collection, MAX_TRANSACTION_ATTEMPTS
        )))
    }

    /// Transactional update of an existing hunter.
    async fn modify_hunter<F>(&self, id: &str, mut modify: F) -> Result<Hunter, AppError>
    where
        F: FnMut(&mut Hunter) -> Result<(), AppError>,
    {
        self.transact(collections::HUNTERS, id, |current: Option<Hunter>, _| {
            let mut hunter = current.ok_or_else(|| hunter_not_found(id))?;
            modify(&mut hunter)?;
            Ok((Some(hunter.clone()), hunter))
        })
        .await
    }

    /// Helper to batch delete documents using transactions.
    async fn batch_delete<T, F>(
        &self,
        items: &[T],
        collection: &str,
        id_extractor: F,
    ) -> Result<(), AppError>
    where
        F: Fn(&T) -> String,
    {
        let client = self.get_client()?;

        for chunk in items.chunks(BATCH_SIZE) {
            let mut transaction = client
                .begin_transaction()
                .await
                .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

            for item in chunk {
                let doc_id = id_extractor(item);
                client
                    .fluent()
                    .delete()
                    .from(collection)
                    .document_id(&doc_id)
                    .add_to_transaction(&mut transaction)
                    .map_err(|e| {
                        AppError::Database(format!(
                            "Failed to add deletion to transaction for {}: {}",
                            collection, e
                        ))
                    })?;
            }

            transaction.commit().await.map_err(|e| {
                AppError::Database(format!("Failed to commit batch deletion: {}", e))
            })?;
        }

        Ok(())
    }

    /// All documents in `collection` owned by `user_id`.
    async fn owned_documents<D>(&self, collection: &str, user_id: &str) -> Result<Vec<D>, AppError>
    where
        D: DeserializeOwned + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a document under a fresh id.
    ///
    /// `build` receives the id. The write fails instead of overwriting when
    /// the id is taken, and is retried with a new id.
    async fn insert<D, F>(&self, collection: &str, build: F) -> Result<D, AppError>
    where
        D: Serialize + DeserializeOwned + Send + Sync,
        F: Fn(u64) -> D,
    {
        let client = self.get_client()?;

        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let id = new_document_id();
            let document = build(id);

            let result: Result<D, firestore::errors::FirestoreError> = client
                .fluent()
                .insert()
                .into(collection)
                .document_id(id.to_string())
                .object(&document)
                .execute()
                .await;

            match result {
                Ok(_) => return Ok(document),
                Err(firestore::errors::FirestoreError::DataConflictError(e)) => {
                    tracing::warn!(collection, id, attempt, error = %e, "Document id taken, retrying");
                }
                Err(e) => return Err(AppError::Database(e.to_string())),
            }
        }

        Err(AppError::Database(format!(
            "Could not allocate a free id in {} after {} attempts",
            collection, MAX_INSERT_ATTEMPTS
        )))
    }

    /// Add a create-only write of `document` to `transaction`.
    ///
    /// If the id is taken the commit fails and [`Self::transact`] retries
    /// with freshly built documents.
    fn create_in_transaction<D>(
        client: &firestore::FirestoreDb,
        transaction: &mut firestore::FirestoreTransaction<'_>,
        collection: &str,
        id: u64,
        document: &D,
    ) -> Result<(), AppError>
    where
        D: Serialize + DeserializeOwned + Send + Sync,
    {
        client
            .fluent()
            .update()
            .in_col(collection)
            .precondition(firestore::FirestoreWritePrecondition::Exists(false))
            .document_id(id.to_string())
            .object(document)
            .add_to_transaction(transaction)
            .map_err(|e| {
                AppError::Database(format!(
                    "Failed to add {} write to transaction: {}",
                    collection, e
                ))
            })?;
        Ok(())
    }
}

#[async_trait]
impl HunterStore for FirestoreDb {
    // ─── Hunter Operations ───────────────────────────────────────

    async fn get_hunter(&self, id: &str) -> Result<Option<Hunter>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::HUNTERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_hunter_by_email(&self, email: &str) -> Result<Option<Hunter>, AppError> {
        let hunters: Vec<Hunter> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::HUNTERS)
            .filter(|q| q.for_all([q.field("email").eq(email)]))
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(hunters.into_iter().next())
    }

    async fn upsert_hunter(&self, identity: &HunterIdentity) -> Result<Hunter, AppError> {
        self.transact(
            collections::HUNTERS,
            &identity.id,
            |current: Option<Hunter>, _| {
                let hunter = match current {
                    Some(mut hunter) => {
                        refresh_identity(&mut hunter, identity);
                        hunter
                    }
                    None => {
                        tracing::info!(user_id = %identity.id, "Creating new hunter");
                        Hunter::new(identity)
                    }
                };
                Ok((Some(hunter.clone()), hunter))
            },
        )
        .await
    }

    async fn update_profile(
        &self,
        id: &str,
        changes: &ProfileChanges,
    ) -> Result<Hunter, AppError> {
        self.modify_hunter(id, |hunter| {
            changes.apply_to(hunter);
            Ok(())
        })
        .await
    }

    async fn update_xp(&self, id: &str, gain: u64) -> Result<Hunter, AppError> {
        self.modify_hunter(id, |hunter| award(hunter, gain, StatDeltas::default()))
            .await
    }

    async fn update_stats(&self, id: &str, deltas: StatDeltas) -> Result<Hunter, AppError> {
        self.modify_hunter(id, |hunter| award(hunter, 0, deltas)).await
    }

    /// Delete ALL data for a hunter.
    ///
    /// Removes owned quests, workouts, meals and system messages, then the
    /// hunter document itself. Returns the number of documents deleted.
    async fn delete_hunter_data(&self, id: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        let quests: Vec<Quest> = self.owned_documents(collections::QUESTS, id).await?;
        self.batch_delete(&quests, collections::QUESTS, |q: &Quest| q.id.to_string())
            .await?;
        deleted_count += quests.len();
        tracing::debug!(user_id = id, count = quests.len(), "Deleted quests");

        let workouts: Vec<Workout> = self.owned_documents(collections::WORKOUTS, id).await?;
        self.batch_delete(&workouts, collections::WORKOUTS, |w: &Workout| {
            w.id.to_string()
        })
        .await?;
        deleted_count += workouts.len();
        tracing::debug!(user_id = id, count = workouts.len(), "Deleted workouts");

        let meals: Vec<Meal> = self.owned_documents(collections::MEALS, id).await?;
        self.batch_delete(&meals, collections::MEALS, |m: &Meal| m.id.to_string())
            .await?;
        deleted_count += meals.len();
        tracing::debug!(user_id = id, count = meals.len(), "Deleted meals");

        let messages: Vec<SystemMessage> = self
            .owned_documents(collections::SYSTEM_MESSAGES, id)
            .await?;
        self.batch_delete(
            &messages,
            collections::SYSTEM_MESSAGES,
            |m: &SystemMessage| m.id.to_string(),
        )
        .await?;
        deleted_count += messages.len();
        tracing::debug!(user_id = id, count = messages.len(), "Deleted system messages");

        if self.get_hunter(id).await?.is_some() {
            self.get_client()?
                .fluent()
                .delete()
                .from(collections::HUNTERS)
                .document_id(id)
                .execute()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            deleted_count += 1;
        }

        tracing::info!(user_id = id, deleted_count, "Hunter data deletion complete");

        Ok(deleted_count)
    }

    async fn leaderboard(&self, limit: usize) -> Result<Vec<Hunter>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::HUNTERS)
            .order_by([("xp", firestore::FirestoreQueryDirection::Descending)])
            .limit(u32::try_from(limit).unwrap_or(u32::MAX))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Workout Operations ──────────────────────────────────────

    async fn list_workouts(
        &self,
        user_id: &str,
        since: Option<DateTime<Utc>>,
        limit: Option<usize>,
    ) -> Result<Vec<Workout>, AppError> {
        let since = since.map(format_utc_rfc3339);

        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::WORKOUTS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    since
                        .clone()
                        .and_then(|since| q.field("date").greater_than_or_equal(since)),
                ])
            })
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)]);

        let query = match limit {
            Some(limit) => query.limit(u32::try_from(limit).unwrap_or(u32::MAX)),
            None => query,
        };

        query
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store the workout and apply its rewards in one transaction.
    ///
    /// The hunter document is read inside the transaction, so a concurrent
    /// XP award forces a retry instead of being overwritten.
    async fn create_workout(
        &self,
        record: WorkoutRecord,
        stat_gain: StatDeltas,
    ) -> Result<(Workout, Hunter), AppError> {
        let client = self.get_client()?;
        let user_id = record.user_id.clone();
        let created_at = now_secs();

        let (workout, hunter) = self
            .transact(
                collections::HUNTERS,
                &user_id,
                |current: Option<Hunter>, transaction| {
                    let mut hunter = current.ok_or_else(|| hunter_not_found(&user_id))?;
                    award(&mut hunter, record.xp_gained, stat_gain)?;

                    let workout = record.clone().into_workout(new_document_id(), created_at);
                    Self::create_in_transaction(
                        client,
                        transaction,
                        collections::WORKOUTS,
                        workout.id,
                        &workout,
                    )?;

                    Ok((Some(hunter.clone()), (workout, hunter)))
                },
            )
            .await?;

        tracing::info!(
            user_id = %user_id,
            workout_id = workout.id,
            xp_gained = workout.xp_gained,
            "Workout stored atomically"
        );

        Ok((workout, hunter))
    }

    // ─── Quest Operations ────────────────────────────────────────

    async fn list_quests(
        &self,
        user_id: &str,
        quest_type: Option<QuestType>,
    ) -> Result<Vec<Quest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::QUESTS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    quest_type.and_then(|t| q.field("type").eq(t.as_str())),
                ])
            })
            .order_by([("id", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn get_quest(&self, quest_id: u64) -> Result<Option<Quest>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::QUESTS)
            .obj()
            .one(&quest_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn delete_quests(&self, user_id: &str, quest_type: QuestType) -> Result<usize, AppError> {
        let quests: Vec<Quest> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::QUESTS)
            .filter(|q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    q.field("type").eq(quest_type.as_str()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        self.batch_delete(&quests, collections::QUESTS, |q: &Quest| q.id.to_string())
            .await?;

        tracing::debug!(
            user_id,
            quest_type = %quest_type,
            count = quests.len(),
            "Deleted quests"
        );
        Ok(quests.len())
    }

    async fn create_quest(&self, user_id: &str, proposal: &QuestProposal) -> Result<Quest, AppError> {
        let created_at = now_secs();
        self.insert(collections::QUESTS, |id| {
            proposal.clone().into_quest(id, user_id, created_at)
        })
        .await
    }

    async fn complete_quest_if_pending(&self, quest_id: u64) -> Result<Option<Quest>, AppError> {
        let completed_at = now_secs();
        self.transact(
            collections::QUESTS,
            &quest_id.to_string(),
            |current: Option<Quest>, _| match current {
                Some(mut quest) => {
                    if quest.mark_completed(completed_at) {
                        Ok((Some(quest.clone()), Some(quest)))
                    } else {
                        Ok((None, None))
                    }
                }
                None => Ok((None, None)),
            },
        )
        .await
    }

    // ─── Meal Operations ─────────────────────────────────────────

    async fn list_meals(
        &self,
        user_id: &str,
        range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    ) -> Result<Vec<Meal>, AppError> {
        let range = range.map(|(start, end)| (format_utc_rfc3339(start), format_utc_rfc3339(end)));

        self.get_client()?
            .fluent()
            .select()
            .from(collections::MEALS)
            .filter(move |q| {
                q.for_all([
                    q.field("user_id").eq(user_id),
                    range
                        .clone()
                        .and_then(|(start, _)| q.field("date").greater_than_or_equal(start)),
                    range
                        .clone()
                        .and_then(|(_, end)| q.field("date").less_than(end)),
                ])
            })
            .order_by([("date", firestore::FirestoreQueryDirection::Descending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store the meal and its discipline award in one transaction.
    async fn create_meal(
        &self,
        user_id: &str,
        meal: NewMeal,
        stat_gain: StatDeltas,
    ) -> Result<(Meal, Hunter), AppError> {
        let client = self.get_client()?;
        let created_at = now_secs();

        self.transact(
            collections::HUNTERS,
            user_id,
            |current: Option<Hunter>, transaction| {
                let mut hunter = current.ok_or_else(|| hunter_not_found(user_id))?;
                award(&mut hunter, 0, stat_gain)?;

                let meal = meal.clone().into_meal(new_document_id(), user_id, created_at);
                Self::create_in_transaction(client, transaction, collections::MEALS, meal.id, &meal)?;

                Ok((Some(hunter.clone()), (meal, hunter)))
            },
        )
        .await
    }

    // ─── System Message Operations ───────────────────────────────

    async fn list_messages(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<SystemMessage>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::SYSTEM_MESSAGES)
            .filter(|q| q.for_all([q.field("user_id").eq(user_id)]))
            .order_by([("id", firestore::FirestoreQueryDirection::Descending)])
            .limit(u32::try_from(limit).unwrap_or(u32::MAX))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store both sides of a chat exchange and the wisdom award in one
    /// transaction.
    async fn record_exchange(
        &self,
        user_id: &str,
        message: &str,
        reply: &str,
        stat_gain: StatDeltas,
    ) -> Result<Hunter, AppError> {
        let client = self.get_client()?;
        let created_at = now_secs();

        let hunter = self
            .transact(
                collections::HUNTERS,
                user_id,
                |current: Option<Hunter>, transaction| {
                    let mut hunter = current.ok_or_else(|| hunter_not_found(user_id))?;
                    award(&mut hunter, 0, stat_gain)?;

                    let ids = [new_document_id(), new_document_id()];
                    for entry in exchange_messages(user_id, ids, message, reply, created_at) {
                        Self::create_in_transaction(
                            client,
                            transaction,
                            collections::SYSTEM_MESSAGES,
                            entry.id,
                            &entry,
                        )?;
                    }

                    Ok((Some(hunter.clone()), hunter))
                },
            )
            .await?;

        tracing::debug!(user_id, "Chat exchange stored");
        Ok(hunter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_ids_fit_in_json_numbers() {
        for _ in 0..1000 {
            let id = new_document_id();
            assert!(id > 0);
            assert!(id <= MAX_DOCUMENT_ID);
        }
    }

    #[test]
    fn test_document_ids_follow_creation_order() {
        let first = new_document_id();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = new_document_id();
        assert!(second > first);
    }

    #[test]
    fn test_document_ids_unique_in_bursts() {
        // Batches of quests are created within the same millisecond.
        let mut seen = std::collections::HashSet::new();
        let mut last = 0;
        for _ in 0..20_000 {
            for _ in 0..3 {
                let id = new_document_id();
                assert!(id > last);
                assert!(seen.insert(id));
                last = id;
            }
        }
    }

    #[test]
    fn test_document_ids_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(|| (0..5_000).map(|_| new_document_id()).collect::<Vec<_>>()))
            .collect();

        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[tokio::test]
    async fn test_offline_client_reports_database_error() {
        let db = FirestoreDb::new_mock();
        let err = db.get_hunter("anyone").await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let err = db.complete_quest_if_pending(1).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let err = db
            .create_quest(
                "anyone",
                &QuestProposal {
                    title: "Q".to_string(),
                    description: "D".to_string(),
                    xp_reward: 100,
                    quest_type: QuestType::Daily,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));

        let err = db
            .record_exchange("anyone", "hi", "Hunter.", StatDeltas::wisdom(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }
}
