// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Secrets (JWT key, provider API key) are injected as environment variables
//! by the deployment; a `.env` file is honoured for local development.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default OpenAI-compatible endpoint for Groq.
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
/// Model used for structured quest generation.
pub const DEFAULT_QUEST_MODEL: &str = "llama-3.3-70b-versatile";
/// Model used for the conversational persona.
pub const DEFAULT_CHAT_MODEL: &str = "llama-3.1-8b-instant";

/// Which persistence backend the server runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Firestore,
    /// Process-local store; data is lost on restart.
    Memory,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StorageBackend::Firestore),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(ConfigError::Invalid("STORAGE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    /// Persistence backend
    pub storage_backend: StorageBackend,
    /// Base URL of the OpenAI-compatible completion API
    pub groq_base_url: String,
    pub quest_model: String,
    pub chat_model: String,
    /// Upper bound for a single provider call
    pub generation_timeout: Duration,

    // --- Secrets ---
    /// JWT verification key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Text-generation provider API key
    pub groq_api_key: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            storage_backend: StorageBackend::Memory,
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            quest_model: DEFAULT_QUEST_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            generation_timeout: Duration::from_secs(20),
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            groq_api_key: "test_groq_key".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage_backend = env::var("STORAGE_BACKEND")
            .map(|raw| raw.parse())
            .unwrap_or(Ok(StorageBackend::Firestore))?;

        let generation_timeout = env::var("GENERATION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(20));

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage_backend,
            groq_base_url: env::var("GROQ_BASE_URL")
                .map(|v| v.trim().trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_GROQ_BASE_URL.to_string()),
            quest_model: env::var("GROQ_QUEST_MODEL")
                .unwrap_or_else(|_| DEFAULT_QUEST_MODEL.to_string()),
            chat_model: env::var("GROQ_CHAT_MODEL")
                .unwrap_or_else(|_| DEFAULT_CHAT_MODEL.to_string()),
            generation_timeout,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            groq_api_key: env::var("GROQ_API_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("GROQ_API_KEY"))?,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}
