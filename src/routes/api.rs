// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated hunters: profile, workouts, meals and
//! progression read models.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::hunter::ProfilePatch;
use crate::models::workout::LoggedWorkout;
use crate::models::{HunterResponse, Meal, NewMeal, NewWorkout, Rank, StatBlock, StatDeltas, Workout};
use crate::routes::parse_limit;
use crate::services::volume::{self, WeeklyVolume};
use crate::time_utils::now_secs;
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, patch},
    Extension, Json, Router,
};
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

const DEFAULT_WORKOUT_LIMIT: usize = 20;
const DEFAULT_LEADERBOARD_LIMIT: usize = 50;
/// Most recent workouts summarised by `/api/stats`.
const STATS_WORKOUT_WINDOW: usize = 30;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/profile", patch(update_profile))
        .route("/api/workouts", get(get_workouts).post(log_workout))
        .route("/api/meals", get(get_meals).post(log_meal))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/stats", get(get_stats))
        .route("/api/stats/intensity", get(get_intensity))
}

#[derive(Deserialize)]
struct LimitQuery {
    limit: Option<String>,
}

// ─── Profile ─────────────────────────────────────────────────

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<HunterResponse>> {
    let hunter = state.profiles.update(&user.user_id, patch).await?;
    Ok(Json(hunter.into()))
}

// ─── Workouts ────────────────────────────────────────────────

/// Newest first.
async fn get_workouts(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<Workout>>> {
    let limit = parse_limit(params.limit.as_deref(), DEFAULT_WORKOUT_LIMIT)?;
    let workouts = state.workouts.list(&user.user_id, limit).await?;
    Ok(Json(workouts))
}

async fn log_workout(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NewWorkout>,
) -> Result<(StatusCode, Json<LoggedWorkout>)> {
    let logged = state.workouts.log_workout(&user.user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(logged)))
}

// ─── Meals ───────────────────────────────────────────────────

#[derive(Deserialize)]
struct MealsQuery {
    /// UTC day, `YYYY-MM-DD`
    date: Option<String>,
}

async fn get_meals(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<MealsQuery>,
) -> Result<Json<Vec<Meal>>> {
    let range = params
        .date
        .as_deref()
        .map(|raw| {
            let day = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest("Invalid date format".to_string()))?;
            let start = day.and_time(NaiveTime::MIN).and_utc();
            Ok::<_, AppError>((start, start + Duration::days(1)))
        })
        .transpose()?;

    let meals = state.db.list_meals(&user.user_id, range).await?;
    Ok(Json(meals))
}

/// Logging a meal is worth one discipline point.
async fn log_meal(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NewMeal>,
) -> Result<(StatusCode, Json<Meal>)> {
    payload.validate()?;

    let (meal, _) = state
        .db
        .create_meal(&user.user_id, payload, StatDeltas::discipline(1))
        .await?;

    tracing::debug!(user_id = %user.user_id, meal_id = meal.id, "Meal logged");
    Ok((StatusCode::CREATED, Json(meal)))
}

// ─── Leaderboard ─────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LeaderboardEntry {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_image_url: Option<String>,
    pub level: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub xp: u64,
    pub rank: Rank,
}

async fn get_leaderboard(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>> {
    let limit = parse_limit(params.limit.as_deref(), DEFAULT_LEADERBOARD_LIMIT)?;

    let entries = state
        .db
        .leaderboard(limit)
        .await?
        .into_iter()
        .map(|hunter| {
            let progression = hunter.progression();
            LeaderboardEntry {
                id: hunter.id,
                first_name: hunter.first_name,
                last_name: hunter.last_name,
                profile_image_url: hunter.profile_image_url,
                level: progression.level,
                xp: progression.xp,
                rank: progression.rank,
            }
        })
        .collect();

    Ok(Json(entries))
}

// ─── Stats ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsResponse {
    pub level: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub xp: u64,
    pub rank: Rank,
    pub stats: StatBlock,
    pub progress: StatsProgress,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct StatsProgress {
    /// Counted over the most recent 30 workouts
    pub total_workouts: usize,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub total_xp: u64,
    pub quests_completed: usize,
    pub current_streak: u32,
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<StatsResponse>> {
    let hunter = state
        .db
        .get_hunter(&user.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let (workouts, quests) = tokio::try_join!(
        state
            .db
            .list_workouts(&user.user_id, None, Some(STATS_WORKOUT_WINDOW)),
        state.db.list_quests(&user.user_id, None),
    )?;

    let today = now_secs().date_naive();
    let progression = hunter.progression();

    Ok(Json(StatsResponse {
        level: progression.level,
        xp: progression.xp,
        rank: progression.rank,
        stats: hunter.stats,
        progress: StatsProgress {
            total_workouts: workouts.len(),
            total_xp: hunter.xp,
            quests_completed: quests.iter().filter(|q| q.completed).count(),
            current_streak: volume::current_streak(workouts.iter().map(|w| w.date), today),
        },
    }))
}

/// Weekly training volume for the intensity chart (12 ISO weeks).
async fn get_intensity(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<WeeklyVolume>>> {
    let now = now_secs();
    let history = state
        .db
        .list_workouts(
            &user.user_id,
            Some(now - Duration::days(volume::INTENSITY_DAYS)),
            None,
        )
        .await?;

    Ok(Json(volume::weekly_volume(&history, now)))
}
