// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Training volume analysis: week-over-week comparison, ISO-week
//! intensity buckets and workout streaks.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::Workout;

/// Days of history the week-over-week comparison looks at.
pub const HISTORY_DAYS: i64 = 14;
/// Days of history bucketed for the intensity chart (12 weeks).
pub const INTENSITY_DAYS: i64 = 84;

/// Result of comparing this week's volume with last week's.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeAnalysis {
    pub this_week: f64,
    pub last_week: f64,
    pub progressive_overload: bool,
    pub message: String,
}

/// Total volume of one ISO week.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeeklyVolume {
    /// `YYYY-Www`
    pub week: String,
    pub total_volume: f64,
}

/// Compare the trailing 7 days (plus the workout being logged) with the
/// 7 days before.
///
/// Workouts older than 14 days are ignored. A workout exactly 7 days old
/// counts toward last week.
pub fn analyze(history: &[Workout], new_volume: f64, now: DateTime<Utc>) -> VolumeAnalysis {
    let one_week_ago = now - Duration::days(7);
    let two_weeks_ago = now - Duration::days(HISTORY_DAYS);

    let (mut this_week, last_week) = history
        .iter()
        .filter(|w| w.date >= two_weeks_ago)
        .fold((0.0, 0.0), |(this, last), w| {
            if w.date > one_week_ago {
                (this + w.total_volume, last)
            } else {
                (this, last + w.total_volume)
            }
        });
    this_week += new_volume;

    let progressive_overload = this_week > last_week;
    let message = if progressive_overload {
        format!(
            "Progressive Overload DETECTED! Your strength grows, Hunter. Last week: {}kg. This week: {}kg.",
            whole_kg(last_week),
            whole_kg(this_week)
        )
    } else {
        format!(
            "Training recorded. Consistent effort is key. Last week: {}kg. This week: {}kg. Push harder next time.",
            whole_kg(last_week),
            whole_kg(this_week)
        )
    };

    VolumeAnalysis {
        this_week,
        last_week,
        progressive_overload,
        message,
    }
}

fn whole_kg(volume: f64) -> i64 {
    volume.round() as i64
}

/// Volume per ISO week over the trailing 84 days, oldest week first.
/// Weeks without workouts are omitted.
pub fn weekly_volume(history: &[Workout], now: DateTime<Utc>) -> Vec<WeeklyVolume> {
    let cutoff = now - Duration::days(INTENSITY_DAYS);
    let mut buckets: BTreeMap<(i32, u32), f64> = BTreeMap::new();

    for workout in history.iter().filter(|w| w.date >= cutoff) {
        let week = workout.date.iso_week();
        *buckets.entry((week.year(), week.week())).or_default() += workout.total_volume;
    }

    buckets
        .into_iter()
        .map(|((year, week), total_volume)| WeeklyVolume {
            week: format!("{}-W{:02}", year, week),
            total_volume,
        })
        .collect()
}

/// Consecutive UTC days with at least one workout, ending today.
///
/// A streak that ended yesterday is still alive until today is over.
pub fn current_streak<I>(dates: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let days: BTreeSet<NaiveDate> = dates.into_iter().map(|d| d.date_naive()).collect();

    let mut day = if days.contains(&today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if days.contains(&yesterday) => yesterday,
            _ => return 0,
        }
    };

    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}
