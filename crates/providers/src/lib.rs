//! Model-backed capability implementations for Veloce.
//!
//! Chat completion implements `veloce_core::ChatModel`; transcription
//! implements `veloce_core::SpeechToText`. The builder wires both from
//! configuration.

pub mod builder;
pub mod http;
pub mod openai_compat;
pub mod transcription;

pub use builder::{build_chat_model, build_transcriber};
pub use openai_compat::OpenAiCompatChatModel;
pub use transcription::{WhisperTranscriber, encode_wav, load_wav};
