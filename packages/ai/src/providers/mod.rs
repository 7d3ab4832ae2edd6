//! LLM provider abstraction and implementations.

pub mod anthropic;

use serde::{Deserialize, Serialize};

use crate::AiError;

/// Model used when `AI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// A message in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Plain-text content.
    pub content: String,
}

/// A structured content block within a model reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Text content.
    Text {
        /// The text.
        text: String,
    },
    /// A tool use request from the assistant.
    ToolUse {
        /// Unique ID for this tool use.
        id: String,
        /// Tool name.
        name: String,
        /// Tool input parameters.
        input: serde_json::Value,
    },
}

/// Response from the LLM provider.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    /// Content blocks in the response.
    pub content: Vec<ContentBlock>,
    /// Why generation stopped.
    pub stop_reason: StopReason,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Model finished its response naturally.
    EndTurn,
    /// Model wants to call one or more tools.
    ToolUse,
    /// Maximum tokens reached.
    MaxTokens,
}

/// Trait for LLM providers.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request with tool definitions.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the request fails.
    async fn chat(
        &self,
        system_prompt: &str,
        messages: &[Message],
        tools: &[serde_json::Value],
    ) -> Result<LlmResponse, AiError>;
}

/// Provider selection, read once at start-up by the server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// `AI_PROVIDER`; Anthropic when unset.
    pub provider: Option<String>,
    /// `ANTHROPIC_API_KEY`.
    pub api_key: Option<String>,
    /// `AI_MODEL`; [`DEFAULT_MODEL`] when unset.
    pub model: Option<String>,
}

/// Creates the configured LLM provider.
///
/// # Errors
///
/// * [`AiError::NotConfigured`] if the provider's API key is missing
/// * [`AiError::Config`] if the provider name is unknown
/// * [`AiError::Http`] if the HTTP client cannot be built
pub fn create_provider(config: &ProviderConfig) -> Result<Box<dyn LlmProvider>, AiError> {
    let provider = config.provider.as_deref().unwrap_or("anthropic");

    match provider.to_lowercase().as_str() {
        "anthropic" | "claude" => {
            let api_key = config.api_key.clone().ok_or_else(|| AiError::NotConfigured {
                message: "ANTHROPIC_API_KEY environment variable not set".to_string(),
            })?;
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string());
            log::info!("Using Anthropic provider with model {model}");
            Ok(Box::new(anthropic::AnthropicProvider::new(api_key, model)?))
        }
        other => Err(AiError::Config {
            message: format!("Unknown AI provider: {other}. Use 'anthropic'."),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let err = create_provider(&ProviderConfig::default()).err().unwrap();
        assert!(matches!(err, AiError::NotConfigured { .. }));
    }

    #[test]
    fn unknown_provider_is_config_error() {
        let config = ProviderConfig {
            provider: Some("carrier-pigeon".to_string()),
            api_key: Some("key".to_string()),
            model: None,
        };
        let err = create_provider(&config).err().unwrap();
        assert!(matches!(err, AiError::Config { .. }));
    }

    #[test]
    fn anthropic_with_key_is_created() {
        let config = ProviderConfig {
            provider: Some("Claude".to_string()),
            api_key: Some("key".to_string()),
            model: None,
        };
        assert!(create_provider(&config).is_ok());
    }

    #[test]
    fn tool_use_block_serializes_with_type_tag() {
        let block = ContentBlock::ToolUse {
            id: "toolu_1".to_string(),
            name: "fly_to_location".to_string(),
            input: serde_json::json!({ "longitude": -118.4, "latitude": 33.9 }),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "tool_use");
        assert_eq!(json["name"], "fly_to_location");
    }
}
