// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use hunter_system::config::Config;
use hunter_system::db::{FirestoreDb, HunterStore, MemoryDb};
use hunter_system::routes::create_router;
use hunter_system::services::generator::GenerationKind;
use hunter_system::services::{GenerationError, GenerationRequest, TextGenerator};
use hunter_system::AppState;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Canned provider output, chosen by request kind. `None` simulates an
/// unreachable provider.
#[allow(dead_code)]
pub struct ScriptedGenerator {
    pub structured: Option<String>,
    pub conversational: Option<String>,
    pub calls: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedGenerator {
    pub fn new(structured: Option<&str>, conversational: Option<&str>) -> Self {
        Self {
            structured: structured.map(str::to_string),
            conversational: conversational.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }

    /// A provider that fails every call.
    pub fn offline() -> Self {
        Self::new(None, None)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = match request.kind {
            GenerationKind::Structured => &self.structured,
            GenerationKind::Conversational => &self.conversational,
        };
        reply
            .clone()
            .ok_or_else(|| GenerationError::Transport("connection refused".to_string()))
    }
}

/// Three well-formed daily quests.
#[allow(dead_code)]
pub const DAILY_QUESTS: &str = r#"{"quests": [
    {"title": "Iron Will", "description": "Complete 100 push-ups.", "xpReward": 120},
    {"title": "Road Runner", "description": "Run 5 km.", "xpReward": 150},
    {"title": "Stillness", "description": "Hold a plank for 3 minutes.", "xpReward": 80}
]}"#;

/// Create a test app over an in-memory store and `generator`.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app_with(generator: ScriptedGenerator) -> (axum::Router, Arc<AppState>) {
    let db: Arc<dyn HunterStore> = Arc::new(MemoryDb::new());
    let state = Arc::new(AppState::new(Config::default(), db, Arc::new(generator)));
    (create_router(state.clone()), state)
}

/// Create a test app whose provider returns [`DAILY_QUESTS`] and a fixed
/// chat reply.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with(ScriptedGenerator::new(
        Some(DAILY_QUESTS),
        Some("Your training is noted, Hunter."),
    ))
}

/// Create a test app over a Firestore store with no connection, so every
/// store call fails with a database error.
#[allow(dead_code)]
pub fn create_offline_firestore_app() -> (axum::Router, Arc<AppState>) {
    let db: Arc<dyn HunterStore> = Arc::new(FirestoreDb::new_mock());
    let generator = ScriptedGenerator::new(Some(DAILY_QUESTS), Some("Noted."));
    let state = Arc::new(AppState::new(Config::default(), db, Arc::new(generator)));
    (create_router(state.clone()), state)
}

/// Create a test JWT token for `user_id`.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        email: String,
        exp: usize,
        iat: usize,
    }

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;

    let claims = Claims {
        sub: user_id,
        email: format!("{}@example.com", user_id),
        exp: now + 86400,
        iat: now,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

/// Build an authenticated request with an optional JSON body.
#[allow(dead_code)]
pub fn authed_request(
    method: &str,
    uri: &str,
    token: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Collect a response body as JSON.
#[allow(dead_code)]
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
