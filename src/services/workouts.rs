// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Workout logging.
//!
//! Flow:
//! 1. Validate the payload, reject future dates and compute volume from
//!    the submitted sets
//! 2. Compare against the trailing 14 days of history
//! 3. Derive XP and stat rewards
//! 4. Store the workout and its rewards in one atomic operation

use chrono::Duration;
use std::sync::Arc;
use validator::Validate;

use crate::db::HunterStore;
use crate::error::{AppError, Result};
use crate::models::workout::{total_volume, LoggedWorkout, WorkoutAnalysis};
use crate::models::{NewWorkout, Workout, WorkoutRecord};
use crate::services::{progression, volume};
use crate::time_utils::{now_secs, truncate_to_secs};

/// Allowance for client clocks running ahead when checking workout dates.
const FUTURE_DATE_TOLERANCE_MINUTES: i64 = 5;

pub struct WorkoutService {
    db: Arc<dyn HunterStore>,
}

impl WorkoutService {
    pub fn new(db: Arc<dyn HunterStore>) -> Self {
        Self { db }
    }

    pub async fn list(&self, user_id: &str, limit: usize) -> Result<Vec<Workout>> {
        self.db.list_workouts(user_id, None, Some(limit)).await
    }

    pub async fn log_workout(&self, user_id: &str, payload: NewWorkout) -> Result<LoggedWorkout> {
        payload.validate()?;

        let now = now_secs();
        if payload
            .date
            .is_some_and(|date| date > now + Duration::minutes(FUTURE_DATE_TOLERANCE_MINUTES))
        {
            return Err(AppError::BadRequest(
                "Workout date cannot be in the future".to_string(),
            ));
        }
        let volume = total_volume(&payload.exercises);

        let history = self
            .db
            .list_workouts(
                user_id,
                Some(now - Duration::days(volume::HISTORY_DAYS)),
                None,
            )
            .await?;
        let comparison = volume::analyze(&history, volume, now);

        let xp_gained = progression::xp_from_workout(volume);
        let stat_gain =
            progression::stat_delta_from_workout(volume, i64::from(payload.duration_minutes));

        let record = WorkoutRecord {
            user_id: user_id.to_string(),
            date: payload.date.map(truncate_to_secs).unwrap_or(now),
            exercises: payload.exercises,
            total_volume: volume,
            duration_minutes: payload.duration_minutes,
            notes: payload.notes,
            photo_url: payload.photo_url,
            xp_gained,
        };

        let (workout, hunter) = self.db.create_workout(record, stat_gain).await?;

        tracing::info!(
            user_id,
            workout_id = workout.id,
            total_volume = volume,
            xp_gained,
            progressive_overload = comparison.progressive_overload,
            "Workout logged"
        );

        Ok(LoggedWorkout {
            workout,
            analysis: WorkoutAnalysis {
                progressive_overload: comparison.progressive_overload,
                xp_gained,
                message: comparison.message,
                this_week_volume: comparison.this_week,
                last_week_volume: comparison.last_week,
                strength_gain: stat_gain.strength,
                endurance_gain: stat_gain.endurance,
            },
            hunter: hunter.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use crate::error::AppError;
    use crate::models::{Exercise, HunterIdentity, WorkoutSet};

    fn payload(weight: f64, reps: u32, sets: usize, duration_minutes: u32) -> NewWorkout {
        NewWorkout {
            date: None,
            exercises: vec![Exercise {
                name: "Barbell Squat".to_string(),
                sets: vec![WorkoutSet { weight, reps }; sets],
            }],
            duration_minutes,
            notes: None,
            photo_url: None,
        }
    }

    async fn service() -> (Arc<MemoryDb>, WorkoutService) {
        let db = Arc::new(MemoryDb::new());
        db.upsert_hunter(&HunterIdentity {
            id: "h".to_string(),
            ..HunterIdentity::default()
        })
        .await
        .unwrap();
        (db.clone(), WorkoutService::new(db))
    }

    #[tokio::test]
    async fn test_first_workout_rewards() {
        let (_, service) = service().await;

        // 5 × 5 × 100kg = 2500kg over 65 minutes
        let logged = service
            .log_workout("h", payload(100.0, 5, 5, 65))
            .await
            .unwrap();

        assert_eq!(logged.workout.total_volume, 2500.0);
        assert_eq!(logged.analysis.xp_gained, 75);
        assert_eq!(logged.analysis.strength_gain, 1);
        assert_eq!(logged.analysis.endurance_gain, 2);
        assert!(logged.analysis.progressive_overload);
        assert_eq!(logged.hunter.xp, 75);
        assert_eq!(logged.hunter.stats.strength, 11);
        assert_eq!(logged.hunter.stats.endurance, 12);
    }

    #[tokio::test]
    async fn test_second_workout_counts_history() {
        let (_, service) = service().await;
        service
            .log_workout("h", payload(100.0, 10, 1, 30))
            .await
            .unwrap();

        let logged = service
            .log_workout("h", payload(50.0, 10, 1, 30))
            .await
            .unwrap();
        assert_eq!(logged.analysis.this_week_volume, 1500.0);
        assert_eq!(logged.analysis.last_week_volume, 0.0);
        assert_eq!(logged.hunter.xp, 60 + 55);
    }

    #[tokio::test]
    async fn test_invalid_payload_writes_nothing() {
        let (db, service) = service().await;
        let mut bad = payload(100.0, 5, 1, 30);
        bad.exercises.clear();

        let err = service.log_workout("h", bad).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(db.list_workouts("h", None, None).await.unwrap().is_empty());
        assert_eq!(db.get_hunter("h").await.unwrap().unwrap().xp, 0);
    }

    #[tokio::test]
    async fn test_future_date_rejected() {
        let (db, service) = service().await;

        let mut tomorrow = payload(100.0, 5, 1, 30);
        tomorrow.date = Some(now_secs() + Duration::days(1));
        let err = service.log_workout("h", tomorrow).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(db.list_workouts("h", None, None).await.unwrap().is_empty());
        assert_eq!(db.get_hunter("h").await.unwrap().unwrap().xp, 0);

        // A client clock slightly ahead is tolerated.
        let mut skewed = payload(100.0, 5, 1, 30);
        skewed.date = Some(now_secs() + Duration::minutes(1));
        assert!(service.log_workout("h", skewed).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_hunter() {
        let (_, service) = service().await;
        let err = service
            .log_workout("ghost", payload(10.0, 1, 1, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
