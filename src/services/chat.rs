// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! "The System" chat persona.
//!
//! Provider failures never surface as errors: the caller gets a canned
//! reply and nothing is written to the transcript.

use std::sync::Arc;

use crate::db::HunterStore;
use crate::error::{AppError, Result};
use crate::models::message::MAX_CHAT_MESSAGE_CHARS;
use crate::models::{Hunter, MessageRole, StatDeltas, SystemMessage};
use crate::services::generator::{ChatTurn, GenerationRequest, TextGenerator};

/// Transcript messages sent along with each new message.
pub const HISTORY_LIMIT: usize = 10;

pub const UNAVAILABLE_REPLY: &str =
    "The System is temporarily unavailable. A connection error occurred. Please try again.";
pub const EMPTY_REPLY: &str = "The System is processing your request...";

pub struct SystemChat {
    db: Arc<dyn HunterStore>,
    generator: Arc<dyn TextGenerator>,
}

impl SystemChat {
    pub fn new(db: Arc<dyn HunterStore>, generator: Arc<dyn TextGenerator>) -> Self {
        Self { db, generator }
    }

    pub async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<SystemMessage>> {
        self.db.list_messages(user_id, limit).await
    }

    /// Answer `message` in character.
    ///
    /// On success the user message and the reply are appended to the
    /// transcript and the hunter gains one wisdom point.
    pub async fn respond(&self, user_id: &str, message: &str) -> Result<String> {
        let message = message.trim();
        if message.is_empty() {
            return Err(AppError::BadRequest("Valid message is required".to_string()));
        }
        if message.chars().count() > MAX_CHAT_MESSAGE_CHARS {
            return Err(AppError::BadRequest(format!(
                "Message too long. Maximum {} characters.",
                MAX_CHAT_MESSAGE_CHARS
            )));
        }

        let hunter = self
            .db
            .get_hunter(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hunter {} not found", user_id)))?;
        let history = self.db.list_messages(user_id, HISTORY_LIMIT).await?;

        let mut turns = Vec::with_capacity(history.len() + 2);
        turns.push(ChatTurn::system(build_system_prompt(&hunter)));
        // Stored newest first; the model wants oldest first.
        turns.extend(history.iter().rev().map(|m| match m.role {
            MessageRole::User => ChatTurn::user(m.content.as_str()),
            MessageRole::Assistant => ChatTurn::assistant(m.content.as_str()),
        }));
        turns.push(ChatTurn::user(message));

        let reply = match self
            .generator
            .generate(&GenerationRequest::conversational(turns))
            .await
        {
            Ok(text) if text.trim().is_empty() => EMPTY_REPLY.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "System chat generation failed");
                return Ok(UNAVAILABLE_REPLY.to_string());
            }
        };

        self.db
            .record_exchange(user_id, message, &reply, StatDeltas::wisdom(1))
            .await?;

        Ok(reply)
    }
}

/// Persona instructions personalised with the hunter's profile.
pub fn build_system_prompt(hunter: &Hunter) -> String {
    let name = hunter.first_name.as_deref().unwrap_or("Hunter");
    format!(
        "You are \"The System\", a sophisticated, no-nonsense AI from a sci-fi RPG world. \
         You guide hunters through their physical training like a game interface: terse, \
         commanding, and precise. Address the user as a hunter and frame advice as directives.\n\
         \n\
         HUNTER PROFILE:\n\
         - Name: {name}\n\
         - Level: {level}\n\
         - Rank: {rank}\n\
         - Goal: {goal}\n\
         - Class: {class}\n\
         \n\
         Keep replies under 150 words. Give concrete training or nutrition guidance when asked.",
        level = hunter.level(),
        rank = hunter.rank(),
        goal = hunter.fitness_goal.as_deref().unwrap_or("Not set"),
        class = hunter.character_class.as_deref().unwrap_or("N/A"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;
    use crate::models::HunterIdentity;
    use crate::services::generator::GenerationError;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replies with a fixed text and records the transcript it was sent.
    struct Recording {
        reply: std::result::Result<&'static str, ()>,
        seen: Mutex<Vec<Vec<ChatTurn>>>,
    }

    #[async_trait]
    impl TextGenerator for Recording {
        async fn generate(
            &self,
            request: &GenerationRequest,
        ) -> std::result::Result<String, GenerationError> {
            self.seen.lock().unwrap().push(request.messages.clone());
            self.reply
                .map(str::to_string)
                .map_err(|_| GenerationError::Timeout)
        }
    }

    async fn setup(
        reply: std::result::Result<&'static str, ()>,
    ) -> (Arc<MemoryDb>, Arc<Recording>, SystemChat) {
        let db = Arc::new(MemoryDb::new());
        db.upsert_hunter(&HunterIdentity {
            id: "h".to_string(),
            first_name: Some("Jin".to_string()),
            ..HunterIdentity::default()
        })
        .await
        .unwrap();
        let generator = Arc::new(Recording {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        let chat = SystemChat::new(db.clone(), generator.clone());
        (db, generator, chat)
    }

    #[tokio::test]
    async fn test_reply_is_stored_and_awards_wisdom() {
        let (db, _, chat) = setup(Ok("Directive: rest 90 seconds.")).await;

        let reply = chat.respond("h", "  How long should I rest?  ").await.unwrap();
        assert_eq!(reply, "Directive: rest 90 seconds.");

        let messages = db.list_messages("h", 10).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::Assistant);
        assert_eq!(messages[1].role, MessageRole::User);
        assert_eq!(messages[1].content, "How long should I rest?");

        let hunter = db.get_hunter("h").await.unwrap().unwrap();
        assert_eq!(hunter.stats.wisdom, 11);
    }

    #[tokio::test]
    async fn test_history_sent_oldest_first() {
        let (_, generator, chat) = setup(Ok("ok")).await;
        chat.respond("h", "first").await.unwrap();
        chat.respond("h", "second").await.unwrap();

        let seen = generator.seen.lock().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last[0].role, crate::services::generator::TurnRole::System);
        assert!(last[0].content.contains("- Name: Jin"));
        assert_eq!(last[1], ChatTurn::user("first"));
        assert_eq!(last[2], ChatTurn::assistant("ok"));
        assert_eq!(last[3], ChatTurn::user("second"));
    }

    #[tokio::test]
    async fn test_provider_failure_returns_canned_reply() {
        let (db, _, chat) = setup(Err(())).await;

        let reply = chat.respond("h", "hello").await.unwrap();
        assert_eq!(reply, UNAVAILABLE_REPLY);
        assert!(db.list_messages("h", 10).await.unwrap().is_empty());
        assert_eq!(db.get_hunter("h").await.unwrap().unwrap().stats.wisdom, 10);
    }

    #[tokio::test]
    async fn test_empty_provider_text() {
        let (_, _, chat) = setup(Ok("   ")).await;
        assert_eq!(chat.respond("h", "hello").await.unwrap(), EMPTY_REPLY);
    }

    #[tokio::test]
    async fn test_message_validation() {
        let (_, _, chat) = setup(Ok("ok")).await;
        assert!(matches!(
            chat.respond("h", "   ").await,
            Err(AppError::BadRequest(_))
        ));

        let long = "a".repeat(1001);
        assert!(matches!(
            chat.respond("h", &long).await,
            Err(AppError::BadRequest(_))
        ));
        assert!(chat.respond("h", &"a".repeat(1000)).await.is_ok());
    }

    /// Deletes the hunter while the reply is being generated.
    struct DeletesHunter {
        db: Arc<MemoryDb>,
    }

    #[async_trait]
    impl TextGenerator for DeletesHunter {
        async fn generate(
            &self,
            _request: &GenerationRequest,
        ) -> std::result::Result<String, GenerationError> {
            self.db.delete_hunter_data("h").await.unwrap();
            Ok("Too late.".to_string())
        }
    }

    #[tokio::test]
    async fn test_hunter_deleted_mid_exchange_leaves_no_transcript() {
        let (db, _, _) = setup(Ok("unused")).await;
        let chat = SystemChat::new(db.clone(), Arc::new(DeletesHunter { db: db.clone() }));

        let err = chat.respond("h", "hello").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert!(db.list_messages("h", 10).await.unwrap().is_empty());
    }
}
