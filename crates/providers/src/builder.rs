//! Build chat and transcription backends from configuration.

use std::sync::Arc;

use veloce_config::AppConfig;
use veloce_core::error::ProviderError;
use veloce_core::provider::ChatModel;
use veloce_core::speech::SpeechToText;

use crate::openai_compat::OpenAiCompatChatModel;
use crate::transcription::WhisperTranscriber;

/// Short backend name derived from the base URL, used in logs.
pub fn backend_name(api_url: &str) -> &'static str {
    if api_url.contains("groq.com") {
        "groq"
    } else if api_url.contains("openai.com") {
        "openai"
    } else if api_url.contains("openrouter.ai") {
        "openrouter"
    } else {
        "custom"
    }
}

/// Build the chat model described by `config.model`.
pub fn build_chat_model(config: &AppConfig) -> Result<Arc<dyn ChatModel>, ProviderError> {
    let api_key = config.model.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no API key (set VELOCE_API_KEY, GROQ_API_KEY or model.api_key)".into(),
        )
    })?;

    let model = OpenAiCompatChatModel::new(
        backend_name(&config.model.api_url),
        &config.model.api_url,
        api_key,
    )
    .with_models(&config.model.text_model, &config.model.vision_model)
    .with_timeout(config.model.timeout_secs);

    Ok(Arc::new(model))
}

/// Build the transcriber described by `config.speech`.
///
/// Shares the chat model's key; the base URL falls back to `model.api_url`.
pub fn build_transcriber(config: &AppConfig) -> Result<Arc<dyn SpeechToText>, ProviderError> {
    let api_key = config.model.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured("no API key for transcription".into())
    })?;

    let api_url = config
        .speech
        .api_url
        .clone()
        .unwrap_or_else(|| config.model.api_url.clone());

    let transcriber = WhisperTranscriber::new(backend_name(&api_url), &api_url, api_key)
        .with_model(&config.speech.transcription_model);

    Ok(Arc::new(transcriber))
}
