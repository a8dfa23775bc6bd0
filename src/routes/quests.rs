// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Quest routes: listing, regeneration and completion.

use axum::{
    extract::{Path, Query, State},
    routing::{get, patch, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Cadence, CompletedQuest, Quest, QuestType};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/quests", get(get_quests))
        .route("/api/quests/{cadence}", post(regenerate_quests))
        .route("/api/quests/{id}/complete", patch(complete_quest))
}

#[derive(Deserialize)]
struct QuestsQuery {
    #[serde(rename = "type")]
    quest_type: Option<String>,
}

/// Newest first, optionally filtered by type.
async fn get_quests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<QuestsQuery>,
) -> Result<Json<Vec<Quest>>> {
    let quest_type = params
        .quest_type
        .as_deref()
        .map(str::parse::<QuestType>)
        .transpose()
        .map_err(AppError::BadRequest)?;

    let quests = state.quests.list(&user.user_id, quest_type).await?;
    Ok(Json(quests))
}

/// Replace the hunter's daily or weekly quests with a new batch.
async fn regenerate_quests(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(cadence): Path<String>,
) -> Result<Json<Vec<Quest>>> {
    let cadence: Cadence = cadence.parse().map_err(AppError::BadRequest)?;

    let quests = state
        .quests
        .regenerate(&user.user_id, cadence, cadence.default_count())
        .await?;
    Ok(Json(quests))
}

async fn complete_quest(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<CompletedQuest>> {
    let quest_id: u64 = id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid quest ID".to_string()))?;

    let completed = state.quests.complete(&user.user_id, quest_id).await?;
    Ok(Json(completed))
}
