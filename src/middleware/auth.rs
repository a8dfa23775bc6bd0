// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JWT authentication middleware.
//!
//! Tokens are issued by the identity provider; this service only verifies
//! them (HS256, shared signing key).

use crate::error::AppError;
use crate::models::HunterIdentity;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Session cookie carrying the JWT.
pub const SESSION_COOKIE: &str = "hunter_token";

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (auth provider user ID)
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub email: Option<String>,
}

impl AuthUser {
    /// Identity used to create the hunter on first sight.
    pub fn identity(&self) -> HunterIdentity {
        HunterIdentity {
            id: self.user_id.clone(),
            email: self.email.clone(),
            ..HunterIdentity::default()
        }
    }
}

/// Middleware that requires valid JWT authentication.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string)
            .ok_or(AppError::Unauthorized)?
    };

    let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let claims = decode::<Claims>(&token, &key, &validation)
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            AppError::InvalidToken
        })?
        .claims;

    if claims.sub.is_empty() {
        return Err(AppError::InvalidToken);
    }

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(request).await)
}
