// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Meal log model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

use crate::time_utils::rfc3339_secs;

/// Stored meal record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Meal {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub id: u64,
    pub user_id: String,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub calories: Option<u32>,
    /// Grams
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fats: Option<f64>,
    #[serde(with = "rfc3339_secs")]
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub created_at: DateTime<Utc>,
}

/// `POST /api/meals` request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewMeal {
    /// Defaults to now
    #[serde(default, with = "crate::time_utils::rfc3339_secs_option")]
    pub date: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    #[validate(range(max = 20000))]
    pub calories: Option<u32>,
    #[validate(range(min = 0.0, max = 2000.0))]
    pub protein: Option<f64>,
    #[validate(range(min = 0.0, max = 2000.0))]
    pub carbs: Option<f64>,
    #[validate(range(min = 0.0, max = 2000.0))]
    pub fats: Option<f64>,
}

impl NewMeal {
    pub fn into_meal(self, id: u64, user_id: &str, now: DateTime<Utc>) -> Meal {
        Meal {
            id,
            user_id: user_id.to_string(),
            date: self.date.unwrap_or(now),
            title: self.title,
            description: self.description,
            calories: self.calories,
            protein: self.protein,
            carbs: self.carbs,
            fats: self.fats,
            created_at: now,
        }
    }
}
