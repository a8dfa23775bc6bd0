// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Text-generation provider seam.
//!
//! Services talk to the language model through [`TextGenerator`] so the
//! provider can be swapped (see [`super::groq::GroqClient`]) or scripted in
//! tests.

use async_trait::async_trait;
use thiserror::Error;

/// Speaker of one conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

impl TurnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnRole::System => "system",
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
}

impl ChatTurn {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// What the caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationKind {
    /// A single JSON object; uses the quest model in JSON mode.
    Structured,
    /// Free text; uses the chat model.
    Conversational,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub kind: GenerationKind,
    pub messages: Vec<ChatTurn>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl GenerationRequest {
    /// JSON-mode request: a schema-enforcing system turn plus the prompt.
    pub fn structured(prompt: impl Into<String>) -> Self {
        Self {
            kind: GenerationKind::Structured,
            messages: vec![
                ChatTurn::system(
                    "You are an assistant that only responds with valid JSON matching the user's requested schema.",
                ),
                ChatTurn::user(prompt),
            ],
            temperature: 1.1,
            max_tokens: 1024,
        }
    }

    /// Chat request over an already assembled transcript.
    pub fn conversational(messages: Vec<ChatTurn>) -> Self {
        Self {
            kind: GenerationKind::Conversational,
            messages,
            temperature: 0.7,
            max_tokens: 500,
        }
    }
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Provider request failed: {0}")]
    Transport(String),

    #[error("Provider request timed out")]
    Timeout,

    #[error("Provider returned HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Provider returned an empty response")]
    EmptyResponse,

    #[error("Provider response could not be parsed: {0}")]
    Malformed(String),
}

/// A language model that turns a request into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
