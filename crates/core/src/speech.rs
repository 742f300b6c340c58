//! Speech capabilities: transcription of recorded audio and spoken replies.

use async_trait::async_trait;

use crate::error::ProviderError;

/// Sample rate used for voice capture.
pub const DEFAULT_SAMPLE_RATE: u32 = 16_000;

/// Mono 16-bit PCM audio.
#[derive(Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
}

impl AudioClip {
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Clip length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("samples", &self.samples.len())
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}

/// Audio → text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    fn name(&self) -> &str;

    /// Transcribe a clip. `Ok(None)` means no speech was detected.
    async fn transcribe(&self, clip: &AudioClip) -> Result<Option<String>, ProviderError>;
}

/// Text → audible speech.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    fn name(&self) -> &str;

    async fn speak(&self, text: &str) -> Result<(), ProviderError>;
}
