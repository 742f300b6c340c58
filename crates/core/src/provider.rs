//! ChatModel trait: the abstraction over chat-completion backends.
//!
//! A backend exposes two entry points: one for plain-text histories and one
//! for histories that carry images. Which model name each maps to is the
//! implementation's business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// Configuration for a completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The conversation messages, already shaped for the target mode
    pub messages: Vec<Message>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

pub fn default_temperature() -> f32 {
    0.7
}

pub fn default_max_tokens() -> u32 {
    1024
}

impl CompletionRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// The core chat-model trait.
///
/// The response pipeline never sends multi-part content to
/// `complete_text` and never sends a system message to
/// `complete_multimodal`.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// A human-readable name for this backend (e.g., "groq", "openai").
    fn name(&self) -> &str;

    /// Complete a text-only conversation.
    async fn complete_text(&self, request: CompletionRequest) -> Result<String, ProviderError>;

    /// Complete a conversation containing image parts.
    async fn complete_multimodal(
        &self,
        request: CompletionRequest,
    ) -> Result<String, ProviderError>;

    /// Health check: can we reach the backend?
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }
}
