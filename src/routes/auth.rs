// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session routes.
//!
//! Tokens are issued by the identity provider. The first authenticated
//! request for a new subject creates its hunter profile.

use axum::{extract::State, routing::get, Extension, Json, Router};
use std::sync::Arc;

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::HunterResponse;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/auth/user", get(get_current_hunter))
}

/// Current hunter, created on first sight.
async fn get_current_hunter(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<HunterResponse>> {
    let hunter = state.profiles.sign_in(&user.identity()).await?;
    Ok(Json(hunter.into()))
}
