// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Groq client for the OpenAI-compatible `/chat/completions` endpoint.
//!
//! Structured requests go to the quest model with
//! `response_format: {"type": "json_object"}`; conversational requests go to
//! the chat model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::Config;
use crate::services::generator::{
    ChatTurn, GenerationError, GenerationKind, GenerationRequest, TextGenerator,
};

/// Groq API client.
#[derive(Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    quest_model: String,
    chat_model: String,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct GroqRequest<'a> {
    model: &'a str,
    messages: Vec<GroqMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct GroqMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatTurn> for GroqMessage<'a> {
    fn from(turn: &'a ChatTurn) -> Self {
        Self {
            role: turn.role.as_str(),
            content: &turn.content,
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GroqResponse {
    choices: Vec<GroqChoice>,
}

#[derive(Debug, Deserialize)]
struct GroqChoice {
    message: GroqResponseMessage,
}

#[derive(Debug, Deserialize)]
struct GroqResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GroqErrorResponse {
    error: GroqErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GroqErrorDetail {
    message: String,
}

impl GroqClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.groq_base_url.clone(),
            api_key: config.groq_api_key.clone(),
            quest_model: config.quest_model.clone(),
            chat_model: config.chat_model.clone(),
            timeout: config.generation_timeout,
        }
    }

    fn model_for(&self, kind: GenerationKind) -> &str {
        match kind {
            GenerationKind::Structured => &self.quest_model,
            GenerationKind::Conversational => &self.chat_model,
        }
    }

    fn build_request<'a>(&'a self, request: &'a GenerationRequest) -> GroqRequest<'a> {
        GroqRequest {
            model: self.model_for(request.kind),
            messages: request.messages.iter().map(GroqMessage::from).collect(),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: match request.kind {
                GenerationKind::Structured => Some(ResponseFormat {
                    format_type: "json_object",
                }),
                GenerationKind::Conversational => None,
            },
        }
    }
}

/// Map a non-success response to an error, preferring the API's own message.
fn status_error(status: reqwest::StatusCode, body: &str) -> GenerationError {
    let message = serde_json::from_str::<GroqErrorResponse>(body)
        .map(|r| r.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());
    GenerationError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Text of the first choice of a successful response body.
fn completion_text(body: &str) -> Result<String, GenerationError> {
    let response: GroqResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or(GenerationError::EmptyResponse)
}

fn transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout
    } else {
        GenerationError::Transport(e.to_string())
    }
}

#[async_trait]
impl TextGenerator for GroqClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = self.build_request(request);
        tracing::debug!(
            model = body.model,
            messages = body.messages.len(),
            "Sending completion request to Groq"
        );

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let text = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            return Err(status_error(status, &text));
        }

        completion_text(&text)
    }
}
