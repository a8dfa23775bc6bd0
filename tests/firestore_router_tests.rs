// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The router served over the Firestore store.
//!
//! The store has no connection, so every handler that reaches it must
//! answer with a database error instead of panicking or hanging.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{authed_request, create_offline_firestore_app, create_test_jwt, json_body};

#[tokio::test]
async fn test_health_does_not_touch_the_store() {
    let (app, _) = create_offline_firestore_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_store_failures_surface_as_database_errors() {
    let (app, state) = create_offline_firestore_app();
    let token = create_test_jwt("fs-offline", &state.config.jwt_signing_key);

    let meal = json!({"title": "Oats", "calories": 350});
    let workout = json!({
        "exercises": [{"name": "Squat", "sets": [{"weight": 100.0, "reps": 5}]}],
        "duration_minutes": 30
    });
    let chat = json!({"message": "Hello?"});

    for (method, uri, body) in [
        ("GET", "/api/auth/user", None),
        ("GET", "/api/workouts", None),
        ("POST", "/api/workouts", Some(workout)),
        ("POST", "/api/meals", Some(meal)),
        ("GET", "/api/quests", None),
        ("POST", "/api/quests/daily", None),
        ("PATCH", "/api/quests/42/complete", None),
        ("POST", "/api/system/chat", Some(chat)),
        ("GET", "/api/leaderboard", None),
    ] {
        let response = app
            .clone()
            .oneshot(authed_request(method, uri, &token, body))
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::INTERNAL_SERVER_ERROR,
            "{} {}",
            method,
            uri
        );
        let body = json_body(response).await;
        assert_eq!(body["error"], "database_error", "{} {}", method, uri);
    }
}
