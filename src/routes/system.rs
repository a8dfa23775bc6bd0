// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! "The System" chat routes.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{ChatPayload, ChatReply, SystemMessage};
use crate::routes::parse_limit;
use crate::AppState;

const DEFAULT_MESSAGE_LIMIT: usize = 50;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/system/messages", get(get_messages))
        .route("/api/system/chat", post(chat))
}

#[derive(Deserialize)]
struct MessagesQuery {
    limit: Option<String>,
}

/// Transcript, newest first.
async fn get_messages(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<MessagesQuery>,
) -> Result<Json<Vec<SystemMessage>>> {
    let limit = parse_limit(params.limit.as_deref(), DEFAULT_MESSAGE_LIMIT)?;
    let messages = state.chat.history(&user.user_id, limit).await?;
    Ok(Json(messages))
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatReply>> {
    let response = state.chat.respond(&user.user_id, &payload.message).await?;
    Ok(Json(ChatReply { response }))
}
