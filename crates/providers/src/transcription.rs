//! Whisper-style speech-to-text over the OpenAI-compatible
//! `/audio/transcriptions` endpoint.
//!
//! Clips are encoded as 16-bit mono WAV in memory and uploaded as a
//! multipart form.

use std::io::Cursor;
use std::path::Path;

use async_trait::async_trait;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use serde::Deserialize;
use tracing::debug;
use veloce_core::error::ProviderError;
use veloce_core::speech::{AudioClip, SpeechToText};

use crate::http;

/// Remote transcription backend.
pub struct WhisperTranscriber {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

impl WhisperTranscriber {
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: "whisper-large-v3-turbo".into(),
            client: http::client(60),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    fn name(&self) -> &str {
        &self.name
    }

    async fn transcribe(&self, clip: &AudioClip) -> Result<Option<String>, ProviderError> {
        if clip.is_empty() {
            return Ok(None);
        }

        let wav = encode_wav(clip)
            .map_err(|e| ProviderError::InvalidResponse(format!("WAV encoding failed: {e}")))?;

        debug!(
            provider = %self.name,
            model = %self.model,
            seconds = clip.duration_secs(),
            "Sending transcription request"
        );

        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(http::transport_error)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", "json");

        let url = format!("{}/audio/transcriptions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(http::transport_error)?;

        let response = http::check_status(&self.name, response).await?;
        let body: TranscriptionResponse = http::json_body(response).await?;

        let text = body.text.trim();
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(text.to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Encode a clip as a 16-bit mono WAV file.
pub fn encode_wav(clip: &AudioClip) -> Result<Vec<u8>, hound::Error> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: clip.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in &clip.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Read a 16-bit PCM WAV file. Multi-channel audio is averaged down to mono.
pub fn load_wav(path: &Path) -> Result<AudioClip, hound::Error> {
    let reader = WavReader::open(path)?;
    let spec = reader.spec();
    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()?;

    let channels = usize::from(spec.channels.max(1));
    let mono = if channels == 1 {
        samples
    } else {
        samples
            .chunks(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                (sum / frame.len() as i32) as i16
            })
            .collect()
    };

    Ok(AudioClip::new(mono, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn tone() -> AudioClip {
        let samples = (0..1600).map(|i| ((i % 100) * 300) as i16).collect();
        AudioClip::new(samples, 16_000)
    }

    #[test]
    fn encoded_wav_has_riff_header() {
        let wav = encode_wav(&tone()).unwrap();
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 44-byte header + 2 bytes per sample
        assert_eq!(wav.len(), 44 + 1600 * 2);
    }

    #[test]
    fn load_wav_downmixes_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for (l, r) in [(100i16, 300i16), (-200, 200)] {
            writer.write_sample(l).unwrap();
            writer.write_sample(r).unwrap();
        }
        writer.finalize().unwrap();

        let clip = load_wav(&path).unwrap();
        assert_eq!(clip.sample_rate, 8_000);
        assert_eq!(clip.samples, vec![200, 0]);
    }

    #[tokio::test]
    async fn empty_clip_skips_request() {
        let transcriber = WhisperTranscriber::new("groq", "http://127.0.0.1:1", "k");
        let result = transcriber
            .transcribe(&AudioClip::new(Vec::new(), 16_000))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn transcribes_uploaded_clip() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/audio/transcriptions")
            .match_header("authorization", "Bearer gsk-test")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data".into()),
            )
            .with_status(200)
            .with_body(r#"{"text": "  turn on the lights  "}"#)
            .create_async()
            .await;

        let transcriber = WhisperTranscriber::new("groq", server.url(), "gsk-test");
        let text = transcriber.transcribe(&tone()).await.unwrap();

        assert_eq!(text.as_deref(), Some("turn on the lights"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn blank_transcript_is_no_speech() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/audio/transcriptions")
            .with_status(200)
            .with_body(r#"{"text": "   "}"#)
            .create_async()
            .await;

        let transcriber = WhisperTranscriber::new("groq", server.url(), "k");
        assert!(transcriber.transcribe(&tone()).await.unwrap().is_none());
    }
}
