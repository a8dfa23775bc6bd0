// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! AI quest generation with defensive parsing and a deterministic fallback.
//!
//! [`QuestGenerator::generate_quests`] never fails: any provider error,
//! timeout or unusable output yields exactly one fallback quest.

use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{Cadence, Hunter, QuestProposal};
use crate::services::generator::{GenerationRequest, TextGenerator};

pub const FALLBACK_TITLE: &str = "System Directive Fallback";
pub const FALLBACK_DESCRIPTION: &str =
    "Log any workout session to complete this objective. AI quest generation failed.";
pub const FALLBACK_XP: u32 = 50;

/// Why provider output produced no usable quests.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestParseError {
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),

    #[error("response has no quest array")]
    MissingQuests,

    #[error("response contains no valid quests")]
    NoValidQuests,
}

pub struct QuestGenerator {
    generator: Arc<dyn TextGenerator>,
}

impl QuestGenerator {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Generate up to `count` quests of `cadence` for `hunter`.
    ///
    /// The result is never empty and every entry has `cadence`'s type.
    pub async fn generate_quests(
        &self,
        hunter: &Hunter,
        cadence: Cadence,
        count: usize,
    ) -> Vec<QuestProposal> {
        let request = GenerationRequest::structured(build_quest_prompt(hunter, cadence, count));

        let text = match self.generator.generate(&request).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(
                    user_id = %hunter.id,
                    cadence = cadence.as_str(),
                    error = %e,
                    "Quest generation failed, using fallback"
                );
                return vec![fallback_quest(cadence)];
            }
        };

        match parse_quest_response(&text, cadence, count) {
            Ok(quests) => {
                tracing::debug!(
                    user_id = %hunter.id,
                    cadence = cadence.as_str(),
                    count = quests.len(),
                    "Generated quests"
                );
                quests
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %hunter.id,
                    cadence = cadence.as_str(),
                    error = %e,
                    "Unusable quest response, using fallback"
                );
                vec![fallback_quest(cadence)]
            }
        }
    }
}

/// Prompt asking for `{"quests": [{title, description, xpReward}]}`.
pub fn build_quest_prompt(hunter: &Hunter, cadence: Cadence, count: usize) -> String {
    let (min_xp, max_xp) = cadence.xp_range();
    format!(
        "Generate a JSON object for a fitness RPG app.\n\
         The JSON object must have a single key \"quests\", which is an array of quest objects.\n\
         Generate exactly {count} unique {cadence} quests for the user described below.\n\
         \n\
         USER PROFILE:\n\
         - Goal: {goal}\n\
         - Level: {level}\n\
         - Class: {class}\n\
         \n\
         QUEST REQUIREMENTS:\n\
         - Each quest object must have three keys: \"title\" (string), \"description\" (string, one sentence), \
         and \"xpReward\" (integer between {min_xp}-{max_xp}).\n\
         - Do not include any other keys or text outside the main JSON object.",
        cadence = cadence.as_str(),
        goal = hunter.fitness_goal.as_deref().unwrap_or("General fitness"),
        level = hunter.level(),
        class = hunter.character_class.as_deref().unwrap_or("N/A"),
    )
}

/// The single quest returned when generation produces nothing usable.
pub fn fallback_quest(cadence: Cadence) -> QuestProposal {
    QuestProposal {
        title: FALLBACK_TITLE.to_string(),
        description: FALLBACK_DESCRIPTION.to_string(),
        xp_reward: FALLBACK_XP,
        quest_type: cadence.quest_type(),
    }
}

/// Extract up to `count` valid quests from provider text.
///
/// Accepts `{"quests": [...]}` or a bare array, optionally inside a markdown
/// code fence. Invalid entries are skipped; rewards are clamped into the
/// cadence's range.
pub fn parse_quest_response(
    text: &str,
    cadence: Cadence,
    count: usize,
) -> Result<Vec<QuestProposal>, QuestParseError> {
    let value: Value = serde_json::from_str(strip_code_fence(text))
        .map_err(|e| QuestParseError::InvalidJson(e.to_string()))?;

    let candidates = match &value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("quests")
            .and_then(Value::as_array)
            .ok_or(QuestParseError::MissingQuests)?,
        _ => return Err(QuestParseError::MissingQuests),
    };

    let quests: Vec<QuestProposal> = candidates
        .iter()
        .filter_map(|candidate| parse_candidate(candidate, cadence))
        .take(count)
        .collect();

    if quests.is_empty() {
        return Err(QuestParseError::NoValidQuests);
    }
    Ok(quests)
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().trim_end_matches("```").trim()
}

fn parse_candidate(candidate: &Value, cadence: Cadence) -> Option<QuestProposal> {
    let text_field = |key: &str| {
        candidate
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    let title = text_field("title")?;
    let description = text_field("description")?;
    let xp = candidate
        .get("xpReward")
        .or_else(|| candidate.get("xp_reward"))
        .and_then(integer_value)?;

    let (min_xp, max_xp) = cadence.xp_range();
    let xp_reward = xp.clamp(i64::from(min_xp), i64::from(max_xp));

    Some(QuestProposal {
        title,
        description,
        xp_reward: u32::try_from(xp_reward).ok()?,
        quest_type: cadence.quest_type(),
    })
}

/// An integer from a JSON number (integral floats included) or numeric string.
fn integer_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| integral(n.as_f64()?)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| integral(s.parse::<f64>().ok()?))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e15).then_some(f as i64)
}
