//! Turns a conversation into a model request and records the reply.
//!
//! | Current image | Mode | History shaping | Model entry point |
//! |---------------|------|-----------------|-------------------|
//! | none | text-only | parts collapsed to text, empties dropped | `complete_text` |
//! | attached | multimodal | system dropped, stale images dropped, empties dropped | `complete_multimodal` |
//!
//! Nothing is retried. On failure the conversation is left as it was: the
//! user turn stays, no assistant turn is added.

use std::sync::Arc;

use tracing::{debug, info, warn};
use veloce_config::ModelConfig;
use veloce_core::error::ProviderError;
use veloce_core::message::{Content, ContentPart, ImageAttachment, Message, Role};
use veloce_core::provider::{ChatModel, CompletionRequest, default_max_tokens, default_temperature};

use crate::conversation::ConversationState;

/// Which model entry point a request went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationMode {
    TextOnly,
    Multimodal,
}

impl std::fmt::Display for InvocationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvocationMode::TextOnly => write!(f, "text-only"),
            InvocationMode::Multimodal => write!(f, "multimodal"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{mode} model invocation failed: {source}")]
pub struct ModelInvocationError {
    pub mode: InvocationMode,
    #[source]
    pub source: ProviderError,
}

pub struct ResponsePipeline {
    model: Arc<dyn ChatModel>,
    temperature: f32,
    max_tokens: u32,
}

impl ResponsePipeline {
    /// Pipeline with temperature 0.7 and a 1024-token reply cap.
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }

    pub fn from_config(model: Arc<dyn ChatModel>, config: &ModelConfig) -> Self {
        Self::new(model).with_sampling(config.temperature, config.max_tokens)
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Answer the latest turn and append the reply to `state`.
    pub async fn respond(
        &self,
        state: &mut ConversationState,
    ) -> Result<String, ModelInvocationError> {
        let (mode, history) = match state.current_image() {
            Some(image) => (
                InvocationMode::Multimodal,
                multimodal_history(state.messages(), image),
            ),
            None => (InvocationMode::TextOnly, text_only_history(state.messages())),
        };

        debug!(
            model = self.model.name(),
            %mode,
            messages = history.len(),
            "Invoking chat model"
        );

        let mut request = CompletionRequest::new(history);
        request.temperature = self.temperature;
        request.max_tokens = self.max_tokens;

        let result = match mode {
            InvocationMode::TextOnly => self.model.complete_text(request).await,
            InvocationMode::Multimodal => self.model.complete_multimodal(request).await,
        };

        match result {
            Ok(reply) => {
                info!(%mode, chars = reply.len(), "Model replied");
                state.append_assistant(reply.clone());
                Ok(reply)
            }
            Err(source) => {
                warn!(%mode, error = %source, "Model invocation failed");
                Err(ModelInvocationError { mode, source })
            }
        }
    }
}

/// History for the text-only model: every multi-part message collapsed to
/// its space-joined text, empty messages dropped.
pub fn text_only_history(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .filter_map(|message| {
            let text = message.content.text_parts();
            if text.is_empty() {
                return None;
            }
            let mut shaped = message.clone();
            shaped.content = Content::Text(text);
            Some(shaped)
        })
        .collect()
}

/// History for the multimodal model: no system message, and multi-part
/// messages keep only their text and references to `current`.
pub fn multimodal_history(messages: &[Message], current: &ImageAttachment) -> Vec<Message> {
    messages
        .iter()
        .filter(|message| message.role != Role::System)
        .filter_map(|message| match &message.content {
            Content::Text(text) if text.is_empty() => None,
            Content::Text(_) => Some(message.clone()),
            Content::Parts(parts) => {
                let kept: Vec<ContentPart> = parts
                    .iter()
                    .filter(|part| match part {
                        ContentPart::Text(text) => !text.is_empty(),
                        ContentPart::Image(image) => current.matches(image),
                    })
                    .cloned()
                    .collect();
                if kept.is_empty() {
                    return None;
                }
                let mut shaped = message.clone();
                shaped.content = Content::Parts(kept);
                Some(shaped)
            }
        })
        .collect()
}
