//! OpenAI-compatible chat model.
//!
//! Works with: Groq, OpenAI, OpenRouter, Ollama, vLLM and any endpoint that
//! exposes `/chat/completions`.
//!
//! Two model names are configured: one for text-only conversations and a
//! vision-capable one for conversations carrying an image. Multi-part
//! messages are sent as the `[{type: text}, {type: image_url}]` array.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;
use veloce_core::error::ProviderError;
use veloce_core::message::{Content, ContentPart, Message};
use veloce_core::provider::{ChatModel, CompletionRequest};

use crate::http;

/// An OpenAI-compatible chat-completion backend.
pub struct OpenAiCompatChatModel {
    name: String,
    base_url: String,
    api_key: String,
    text_model: String,
    vision_model: String,
    client: reqwest::Client,
}

impl OpenAiCompatChatModel {
    /// Create a new OpenAI-compatible chat model.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            text_model: "llama3-70b-8192".into(),
            vision_model: "llama-3.2-11b-vision-preview".into(),
            client: http::client(120),
        }
    }

    /// Create a Groq backend (convenience constructor).
    pub fn groq(api_key: impl Into<String>) -> Self {
        Self::new("groq", "https://api.groq.com/openai/v1", api_key)
    }

    /// Create an OpenAI backend (convenience constructor).
    pub fn openai(api_key: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key)
            .with_models("gpt-4o-mini", "gpt-4o")
    }

    pub fn with_models(mut self, text_model: impl Into<String>, vision_model: impl Into<String>) -> Self {
        self.text_model = text_model.into();
        self.vision_model = vision_model.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.client = http::client(timeout_secs);
        self
    }

    pub fn text_model(&self) -> &str {
        &self.text_model
    }

    pub fn vision_model(&self) -> &str {
        &self.vision_model
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.to_string(),
                content: match &m.content {
                    Content::Text(text) => ApiContent::Text(text.clone()),
                    Content::Parts(parts) => ApiContent::Parts(
                        parts
                            .iter()
                            .map(|p| match p {
                                ContentPart::Text(text) => ApiPart::Text { text: text.clone() },
                                ContentPart::Image(image) => ApiPart::ImageUrl {
                                    image_url: ApiImageUrl {
                                        url: image.as_str().to_string(),
                                    },
                                },
                            })
                            .collect(),
                    ),
                },
            })
            .collect()
    }

    async fn chat(&self, model: &str, request: CompletionRequest) -> Result<String, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = ApiRequest {
            model,
            messages: Self::to_api_messages(&request.messages),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
        };

        debug!(
            provider = %self.name,
            model,
            messages = request.messages.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status(&self.name, response).await?;
        let api_response: ApiResponse = http::json_body(response).await?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".into()))?;

        Ok(choice.message.content.unwrap_or_default())
    }
}

#[async_trait]
impl ChatModel for OpenAiCompatChatModel {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete_text(&self, request: CompletionRequest) -> Result<String, ProviderError> {
        self.chat(&self.text_model, request).await
    }

    async fn complete_multimodal(
        &self,
        request: CompletionRequest,
    ) -> Result<String, ProviderError> {
        self.chat(&self.vision_model, request).await
    }

    async fn health_check(&self) -> Result<bool, ProviderError> {
        let url = format!("{}/models", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()
            .await
            .map_err(http::transport_error)?;

        Ok(response.status().is_success())
    }
}

// --- OpenAI API types (private) ---

#[derive(Debug, Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage>,
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    content: ApiContent,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum ApiContent {
    Text(String),
    Parts(Vec<ApiPart>),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiPart {
    Text { text: String },
    ImageUrl { image_url: ApiImageUrl },
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
