// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! End-to-end flows over the HTTP API: workouts, meals, stats, the
//! leaderboard and "The System" chat.

use axum::http::StatusCode;
use hunter_system::services::chat::UNAVAILABLE_REPLY;
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{
    authed_request, create_test_app, create_test_app_with, create_test_jwt, json_body,
    ScriptedGenerator,
};

async fn sign_in(app: &axum::Router, token: &str) {
    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/auth/user", token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// 5 × 5 × 100 kg = 2500 kg.
fn squat_session(duration_minutes: u32) -> serde_json::Value {
    json!({
        "exercises": [{
            "name": "Barbell Squat",
            "sets": [
                {"weight": 100.0, "reps": 5},
                {"weight": 100.0, "reps": 5},
                {"weight": 100.0, "reps": 5},
                {"weight": 100.0, "reps": 5},
                {"weight": 100.0, "reps": 5}
            ]
        }],
        "duration_minutes": duration_minutes,
        "notes": "Felt strong"
    })
}

#[tokio::test]
async fn test_log_workout_awards_xp_and_stats() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("f-workout", &state.config.jwt_signing_key);
    sign_in(&app, &token).await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/workouts",
            &token,
            Some(squat_session(65)),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["workout"]["total_volume"], 2500.0);
    assert_eq!(body["workout"]["xp_gained"], 75);
    assert_eq!(body["analysis"]["xp_gained"], 75);
    assert_eq!(body["analysis"]["progressive_overload"], true);
    assert_eq!(body["analysis"]["strength_gain"], 1);
    assert_eq!(body["analysis"]["endurance_gain"], 2);
    assert_eq!(body["hunter"]["xp"], 75);
    assert_eq!(body["hunter"]["stats"]["strength"], 11);
    assert_eq!(body["hunter"]["stats"]["endurance"], 12);

    let response = app
        .oneshot(authed_request("GET", "/api/workouts", &token, None))
        .await
        .unwrap();
    let workouts = json_body(response).await;
    assert_eq!(workouts.as_array().unwrap().len(), 1);
    assert_eq!(workouts[0]["notes"], "Felt strong");
}

#[tokio::test]
async fn test_workout_list_is_newest_first_and_limited() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("f-order", &state.config.jwt_signing_key);
    sign_in(&app, &token).await;

    for (day, minutes) in [("2024-03-10", 30), ("2024-03-12", 40), ("2024-03-11", 50)] {
        let mut session = squat_session(minutes);
        session["date"] = json!(format!("{}T07:00:00Z", day));
        let response = app
            .clone()
            .oneshot(authed_request("POST", "/api/workouts", &token, Some(session)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .oneshot(authed_request("GET", "/api/workouts?limit=2", &token, None))
        .await
        .unwrap();
    let workouts = json_body(response).await;
    let workouts = workouts.as_array().unwrap();

    assert_eq!(workouts.len(), 2);
    assert_eq!(workouts[0]["date"], "2024-03-12T07:00:00Z");
    assert_eq!(workouts[1]["date"], "2024-03-11T07:00:00Z");
}

#[tokio::test]
async fn test_stats_after_workout() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("f-stats", &state.config.jwt_signing_key);
    sign_in(&app, &token).await;

    app.clone()
        .oneshot(authed_request(
            "POST",
            "/api/workouts",
            &token,
            Some(squat_session(65)),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/stats", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["level"], 1);
    assert_eq!(body["xp"], 75);
    assert_eq!(body["rank"], "E-Rank Human");
    assert_eq!(body["progress"]["total_workouts"], 1);
    assert_eq!(body["progress"]["quests_completed"], 0);
    assert_eq!(body["progress"]["current_streak"], 1);

    let response = app
        .oneshot(authed_request("GET", "/api/stats/intensity", &token, None))
        .await
        .unwrap();
    let weeks = json_body(response).await;
    let weeks = weeks.as_array().unwrap();
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0]["total_volume"], 2500.0);
}

#[tokio::test]
async fn test_meal_logging_grants_discipline() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("f-meal", &state.config.jwt_signing_key);
    sign_in(&app, &token).await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/meals",
            &token,
            Some(json!({
                "date": "2024-03-15T12:30:00Z",
                "title": "Chicken and rice",
                "calories": 650,
                "protein": 45.0
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let hunter = state.db.get_hunter("f-meal").await.unwrap().unwrap();
    assert_eq!(hunter.stats.discipline, 11);

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/meals?date=2024-03-15", &token, None))
        .await
        .unwrap();
    let meals = json_body(response).await;
    assert_eq!(meals.as_array().unwrap().len(), 1);
    assert_eq!(meals[0]["title"], "Chicken and rice");

    let response = app
        .oneshot(authed_request("GET", "/api/meals?date=2024-03-16", &token, None))
        .await
        .unwrap();
    assert!(json_body(response).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_leaderboard_orders_by_xp() {
    let (app, state) = create_test_app();
    let light = create_test_jwt("f-light", &state.config.jwt_signing_key);
    let heavy = create_test_jwt("f-heavy", &state.config.jwt_signing_key);
    sign_in(&app, &light).await;
    sign_in(&app, &heavy).await;

    state.db.update_xp("f-heavy", 5000).await.unwrap();
    state.db.update_xp("f-light", 100).await.unwrap();

    let response = app
        .oneshot(authed_request("GET", "/api/leaderboard?limit=2", &light, None))
        .await
        .unwrap();
    let entries = json_body(response).await;
    let entries = entries.as_array().unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["id"], "f-heavy");
    assert_eq!(entries[0]["xp"], 5000);
    assert!(entries[0]["level"].as_u64().unwrap() > entries[1]["level"].as_u64().unwrap());
    assert_eq!(entries[1]["id"], "f-light");
}

#[tokio::test]
async fn test_chat_stores_transcript_and_grants_wisdom() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("f-chat", &state.config.jwt_signing_key);
    sign_in(&app, &token).await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/system/chat",
            &token,
            Some(json!({"message": "  How do I rank up?  "})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["response"], "Your training is noted, Hunter.");

    let response = app
        .oneshot(authed_request("GET", "/api/system/messages", &token, None))
        .await
        .unwrap();
    let messages = json_body(response).await;
    let messages = messages.as_array().unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "assistant");
    assert_eq!(messages[1]["role"], "user");
    assert_eq!(messages[1]["content"], "How do I rank up?");

    let hunter = state.db.get_hunter("f-chat").await.unwrap().unwrap();
    assert_eq!(hunter.stats.wisdom, 11);
}

#[tokio::test]
async fn test_chat_provider_failure_returns_canned_reply() {
    let (app, state) = create_test_app_with(ScriptedGenerator::offline());
    let token = create_test_jwt("f-chat-offline", &state.config.jwt_signing_key);
    sign_in(&app, &token).await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "POST",
            "/api/system/chat",
            &token,
            Some(json!({"message": "Hello?"})),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["response"], UNAVAILABLE_REPLY);

    // Nothing is recorded for a failed exchange.
    let messages = state.db.list_messages("f-chat-offline", 50).await.unwrap();
    assert!(messages.is_empty());
    let hunter = state.db.get_hunter("f-chat-offline").await.unwrap().unwrap();
    assert_eq!(hunter.stats.wisdom, 10);
}

#[tokio::test]
async fn test_sign_in_replaces_stale_profile_with_same_email() {
    let (app, state) = create_test_app();

    // Same email, different subject (e.g. after an auth provider migration).
    let stale = hunter_system::models::HunterIdentity {
        id: "f-old-id".to_string(),
        email: Some("f-new-id@example.com".to_string()),
        ..Default::default()
    };
    state.db.upsert_hunter(&stale).await.unwrap();

    let token = create_test_jwt("f-new-id", &state.config.jwt_signing_key);
    sign_in(&app, &token).await;

    assert!(state.db.get_hunter("f-old-id").await.unwrap().is_none());
    assert!(state.db.get_hunter("f-new-id").await.unwrap().is_some());
}

#[tokio::test]
async fn test_returning_hunter_does_not_purge_shared_email() {
    let (app, state) = create_test_app();
    let token = create_test_jwt("f-returning", &state.config.jwt_signing_key);
    sign_in(&app, &token).await;

    // A second profile later registered with the same email.
    let other = hunter_system::models::HunterIdentity {
        id: "f-other".to_string(),
        email: Some("f-returning@example.com".to_string()),
        ..Default::default()
    };
    state.db.upsert_hunter(&other).await.unwrap();

    sign_in(&app, &token).await;

    assert!(state.db.get_hunter("f-other").await.unwrap().is_some());
    assert!(state.db.get_hunter("f-returning").await.unwrap().is_some());
}
