#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Chat bridge between map users and a language model.
//!
//! Sends the conversation, live infrastructure counts, and the fixed
//! catalog of map tools to an LLM provider, then splits the reply into
//! free text and typed tool invocations. Tools are never executed here:
//! the client runs the returned actions against its own map.

pub mod bridge;
pub mod providers;

pub use bridge::{ChatReply, REFUSAL_MESSAGE, build_system_prompt, handle_chat, respond};

use thiserror::Error;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading live counts from the store failed.
    #[error("Infrastructure query error: {0}")]
    Infrastructure(#[from] mirror_infrastructure::InfrastructureError),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The chat request itself was malformed.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what was wrong.
        message: String,
    },

    /// The provider credential is missing.
    #[error("AI provider not configured: {message}")]
    NotConfigured {
        /// Description.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
