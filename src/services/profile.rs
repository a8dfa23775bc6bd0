// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hunter sign-in and profile updates.

use std::sync::Arc;
use validator::Validate;

use crate::db::HunterStore;
use crate::error::{AppError, Result};
use crate::models::hunter::{FatLevel, ProfilePatch, CLASS_UNLOCK_LEVEL};
use crate::models::{Cadence, Hunter, HunterIdentity, ProfileChanges};
use crate::services::quests::QuestLifecycle;

/// The three accepted shapes of a profile patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    /// Only `profile_image_url`
    Avatar,
    /// Only `character_class`
    ClassSelection,
    /// Onboarding form or full profile edit
    Profile,
}

impl PatchKind {
    pub fn of(patch: &ProfilePatch) -> Self {
        let others_empty = patch.first_name.is_none()
            && patch.last_name.is_none()
            && patch.age.is_none()
            && patch.gender.is_none()
            && patch.height_cm.is_none()
            && patch.weight_kg.is_none()
            && patch.body_fat_percentage.is_none()
            && patch.fitness_level.is_none()
            && patch.fitness_goal.is_none()
            && patch.onboarding_completed.is_none();

        match (
            others_empty,
            patch.profile_image_url.is_some(),
            patch.character_class.is_some(),
        ) {
            (true, true, false) => PatchKind::Avatar,
            (true, false, true) => PatchKind::ClassSelection,
            _ => PatchKind::Profile,
        }
    }
}

pub struct ProfileService {
    db: Arc<dyn HunterStore>,
    quests: Arc<QuestLifecycle>,
}

impl ProfileService {
    pub fn new(db: Arc<dyn HunterStore>, quests: Arc<QuestLifecycle>) -> Self {
        Self { db, quests }
    }

    /// Return the hunter for an authenticated identity, creating it on
    /// first sight.
    ///
    /// When the hunter is new, a stale profile registered under the same
    /// email but a different id (left behind by an auth provider migration)
    /// is deleted first. Returning hunters never trigger that cleanup.
    pub async fn sign_in(&self, identity: &HunterIdentity) -> Result<Hunter> {
        if self.db.get_hunter(&identity.id).await?.is_none() {
            self.remove_stale_profile(identity).await?;
        }

        self.db.upsert_hunter(identity).await
    }

    async fn remove_stale_profile(&self, identity: &HunterIdentity) -> Result<()> {
        let Some(email) = identity.email.as_deref() else {
            return Ok(());
        };
        if let Some(stale) = self.db.find_hunter_by_email(email).await? {
            if stale.id != identity.id {
                tracing::warn!(
                    user_id = %identity.id,
                    stale_id = %stale.id,
                    "Removing stale profile with the same email"
                );
                self.db.delete_hunter_data(&stale.id).await?;
            }
        }
        Ok(())
    }

    pub async fn update(&self, user_id: &str, patch: ProfilePatch) -> Result<Hunter> {
        patch.validate()?;

        let current = self
            .db
            .get_hunter(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hunter {} not found", user_id)))?;

        let kind = PatchKind::of(&patch);
        let changes = match kind {
            PatchKind::Avatar => ProfileChanges {
                profile_image_url: patch.profile_image_url,
                ..ProfileChanges::default()
            },
            PatchKind::ClassSelection => {
                if current.level() < CLASS_UNLOCK_LEVEL {
                    return Err(AppError::BadRequest(format!(
                        "Class selection unlocks at level {}",
                        CLASS_UNLOCK_LEVEL
                    )));
                }
                if current.character_class.is_some() {
                    return Err(AppError::Conflict(
                        "A class has already been chosen".to_string(),
                    ));
                }
                ProfileChanges {
                    character_class: patch.character_class,
                    ..ProfileChanges::default()
                }
            }
            PatchKind::Profile => profile_changes(patch)?,
        };

        let requested_class = changes.character_class.clone();
        let updated = self.db.update_profile(user_id, &changes).await?;

        if kind == PatchKind::ClassSelection && updated.character_class != requested_class {
            return Err(AppError::Conflict(
                "A class has already been chosen".to_string(),
            ));
        }

        if !current.onboarding_completed && updated.onboarding_completed {
            self.seed_quests(user_id).await;
        }

        Ok(updated)
    }

    /// First daily and weekly quests after onboarding. Failures are logged
    /// and do not fail the profile update.
    async fn seed_quests(&self, user_id: &str) {
        let (daily, weekly) = tokio::join!(
            self.quests
                .regenerate(user_id, Cadence::Daily, Cadence::Daily.default_count()),
            self.quests
                .regenerate(user_id, Cadence::Weekly, Cadence::Weekly.default_count()),
        );

        for (cadence, result) in [(Cadence::Daily, daily), (Cadence::Weekly, weekly)] {
            if let Err(e) = result {
                tracing::error!(
                    user_id,
                    cadence = cadence.as_str(),
                    error = %e,
                    "Failed to seed quests after onboarding"
                );
            }
        }
    }
}

fn profile_changes(patch: ProfilePatch) -> Result<ProfileChanges> {
    let first_name = patch
        .first_name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| AppError::BadRequest("Name is a required field.".to_string()))?;

    Ok(ProfileChanges {
        first_name: Some(first_name),
        last_name: patch.last_name,
        profile_image_url: patch.profile_image_url,
        age: patch.age,
        gender: patch.gender,
        height_cm: patch.height_cm,
        weight_kg: patch.weight_kg,
        fat_level: patch.body_fat_percentage.map(FatLevel::from_body_fat),
        body_fat_percentage: patch.body_fat_percentage,
        fitness_level: patch.fitness_level,
        fitness_goal: patch.fitness_goal,
        character_class: None,
        onboarding_completed: patch.onboarding_completed,
    })
}
