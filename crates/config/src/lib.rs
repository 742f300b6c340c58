//! Configuration loading, validation, and management for Veloce.
//!
//! Loads configuration from `~/.veloce/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.veloce/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Chat-completion backend
    #[serde(default)]
    pub model: ModelConfig,

    /// Voice input and spoken replies
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Weather lookups
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Vehicle position and reverse geocoding
    #[serde(default)]
    pub location: LocationConfig,

    /// Music search and playback
    #[serde(default)]
    pub music: MusicConfig,

    /// SOS alerts
    #[serde(default)]
    pub sos: SosConfig,

    /// Vehicle database
    #[serde(default)]
    pub storage: StorageConfig,

    /// Persona and session behaviour
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

fn default_true() -> bool {
    true
}

// ── Model ──────────────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API key shared by chat completion and transcription
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// OpenAI-compatible base URL
    #[serde(default = "default_model_api_url")]
    pub api_url: String,

    /// Model used for text-only conversations
    #[serde(default = "default_text_model")]
    pub text_model: String,

    /// Model used when an image is attached
    #[serde(default = "default_vision_model")]
    pub vision_model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

fn default_model_api_url() -> String {
    "https://api.groq.com/openai/v1".into()
}
fn default_text_model() -> String {
    "llama3-70b-8192".into()
}
fn default_vision_model() -> String {
    "llama-3.2-11b-vision-preview".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}
fn default_model_timeout() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_model_api_url(),
            text_model: default_text_model(),
            vision_model: default_vision_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_model_timeout(),
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("text_model", &self.text_model)
            .field("vision_model", &self.vision_model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ── Speech ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,

    /// Transcription base URL; falls back to `model.api_url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Speak assistant replies aloud
    #[serde(default)]
    pub speak_replies: bool,

    /// Local text-to-speech program, invoked with the reply as its argument
    #[serde(default = "default_tts_command")]
    pub tts_command: String,
}

fn default_transcription_model() -> String {
    "whisper-large-v3-turbo".into()
}
fn default_sample_rate() -> u32 {
    16_000
}
fn default_tts_command() -> String {
    if cfg!(target_os = "macos") {
        "say".into()
    } else {
        "espeak".into()
    }
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            transcription_model: default_transcription_model(),
            api_url: None,
            sample_rate: default_sample_rate(),
            speak_replies: false,
            tts_command: default_tts_command(),
        }
    }
}

// ── Weather ────────────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_weather_api_url")]
    pub api_url: String,

    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,
}

fn default_weather_api_url() -> String {
    "http://api.openweathermap.org/data/2.5/weather".into()
}
fn default_lookup_timeout() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_weather_api_url(),
            timeout_secs: default_lookup_timeout(),
        }
    }
}

impl std::fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

// ── Location ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// "ip" (IP geolocation) or "fixed" (use latitude/longitude below)
    #[serde(default = "default_locator")]
    pub provider: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    #[serde(default = "default_ip_api_url")]
    pub ip_api_url: String,

    #[serde(default = "default_geocoder_url")]
    pub geocoder_url: String,

    /// Sent to the geocoder, which rejects anonymous clients
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_lookup_timeout")]
    pub timeout_secs: u64,
}

fn default_locator() -> String {
    "ip".into()
}
fn default_ip_api_url() -> String {
    "http://ip-api.com/json".into()
}
fn default_geocoder_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".into()
}
fn default_user_agent() -> String {
    concat!("veloce/", env!("CARGO_PKG_VERSION")).into()
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            provider: default_locator(),
            latitude: None,
            longitude: None,
            ip_api_url: default_ip_api_url(),
            geocoder_url: default_geocoder_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_lookup_timeout(),
        }
    }
}

// ── Music ──────────────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct MusicConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_music_search_url")]
    pub search_url: String,

    /// Program that opens a watch URL
    #[serde(default = "default_player_command")]
    pub player_command: String,
}

fn default_music_search_url() -> String {
    "https://www.googleapis.com/youtube/v3/search".into()
}
fn default_player_command() -> String {
    if cfg!(target_os = "macos") {
        "open".into()
    } else {
        "xdg-open".into()
    }
}

impl Default for MusicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            search_url: default_music_search_url(),
            player_command: default_player_command(),
        }
    }
}

impl std::fmt::Debug for MusicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MusicConfig")
            .field("api_key", &redact(&self.api_key))
            .field("search_url", &self.search_url)
            .field("player_command", &self.player_command)
            .finish()
    }
}

// ── SOS ────────────────────────────────────────────────────────────────────

#[derive(Clone, Serialize, Deserialize)]
pub struct SosConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_sid: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Sender number for alert SMS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_number: Option<String>,

    #[serde(default = "default_twilio_api_url")]
    pub api_url: String,
}

fn default_twilio_api_url() -> String {
    "https://api.twilio.com/2010-04-01".into()
}

impl SosConfig {
    /// Whether every credential needed to send SMS is present.
    pub fn is_configured(&self) -> bool {
        self.account_sid.is_some() && self.auth_token.is_some() && self.from_number.is_some()
    }
}

impl Default for SosConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            account_sid: None,
            auth_token: None,
            from_number: None,
            api_url: default_twilio_api_url(),
        }
    }
}

impl std::fmt::Debug for SosConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SosConfig")
            .field("enabled", &self.enabled)
            .field("account_sid", &redact(&self.account_sid))
            .field("auth_token", &redact(&self.auth_token))
            .field("from_number", &self.from_number)
            .field("api_url", &self.api_url)
            .finish()
    }
}

// ── Storage ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// "sqlite" or "memory"
    #[serde(default = "default_storage_backend")]
    pub backend: String,

    /// SQLite file; defaults to `~/.veloce/veloce.db`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

fn default_storage_backend() -> String {
    "sqlite".into()
}

impl StorageConfig {
    pub fn database_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("veloce.db"))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_storage_backend(),
            path: None,
        }
    }
}

// ── Assistant ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Replaces the built-in persona paragraph of the system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,

    /// Vehicle selected when a chat starts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_vehicle: Option<i64>,

    /// Maintenance records summarised in the system prompt
    #[serde(default = "default_maintenance_in_prompt")]
    pub maintenance_in_prompt: usize,
}

fn default_maintenance_in_prompt() -> usize {
    3
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt_override: None,
            default_vehicle: None,
            maintenance_in_prompt: default_maintenance_in_prompt(),
        }
    }
}

// ── Loading ────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from the default path (~/.veloce/config.toml).
    ///
    /// Environment variables override the file:
    /// - `VELOCE_API_KEY`, then `GROQ_API_KEY`, then `OPENAI_API_KEY`
    /// - `VELOCE_TEXT_MODEL`, `VELOCE_VISION_MODEL`
    /// - `OPENWEATHERMAP_API_KEY`, `YOUTUBE_API_KEY`
    /// - `TWILIO_ACCOUNT_SID`, `TWILIO_AUTH_TOKEN`, `TWILIO_PHONE_NUMBER`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from an environment lookup.
    ///
    /// API keys from the environment only fill gaps; model names always win.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.model.api_key.is_none() {
            self.model.api_key = lookup("VELOCE_API_KEY")
                .or_else(|| lookup("GROQ_API_KEY"))
                .or_else(|| lookup("OPENAI_API_KEY"));
        }

        if let Some(model) = lookup("VELOCE_TEXT_MODEL") {
            self.model.text_model = model;
        }
        if let Some(model) = lookup("VELOCE_VISION_MODEL") {
            self.model.vision_model = model;
        }

        if self.weather.api_key.is_none() {
            self.weather.api_key = lookup("OPENWEATHERMAP_API_KEY");
        }
        if self.music.api_key.is_none() {
            self.music.api_key = lookup("YOUTUBE_API_KEY");
        }

        if self.sos.account_sid.is_none() {
            self.sos.account_sid = lookup("TWILIO_ACCOUNT_SID");
        }
        if self.sos.auth_token.is_none() {
            self.sos.auth_token = lookup("TWILIO_AUTH_TOKEN");
        }
        if self.sos.from_number.is_none() {
            self.sos.from_number = lookup("TWILIO_PHONE_NUMBER");
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".veloce")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.temperature < 0.0 || self.model.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.model.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "model.max_tokens must be > 0".into(),
            ));
        }

        if !matches!(self.storage.backend.as_str(), "sqlite" | "memory") {
            return Err(ConfigError::ValidationError(format!(
                "storage.backend must be \"sqlite\" or \"memory\", got \"{}\"",
                self.storage.backend
            )));
        }

        match self.location.provider.as_str() {
            "ip" => {}
            "fixed" => {
                if self.location.latitude.is_none() || self.location.longitude.is_none() {
                    return Err(ConfigError::ValidationError(
                        "location.provider = \"fixed\" requires latitude and longitude".into(),
                    ));
                }
            }
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "location.provider must be \"ip\" or \"fixed\", got \"{other}\""
                )));
            }
        }

        if self.speech.sample_rate == 0 {
            return Err(ConfigError::ValidationError(
                "speech.sample_rate must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if a chat-model API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.model.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model.text_model, "llama3-70b-8192");
        assert_eq!(config.model.vision_model, "llama-3.2-11b-vision-preview");
        assert_eq!(config.model.max_tokens, 1024);
        assert_eq!(config.storage.backend, "sqlite");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.model.text_model, config.model.text_model);
        assert_eq!(parsed.speech.sample_rate, config.speech.sample_rate);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.model.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn unknown_storage_backend_rejected() {
        let mut config = AppConfig::default();
        config.storage.backend = "postgres".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn fixed_location_requires_coordinates() {
        let mut config = AppConfig::default();
        config.location.provider = "fixed".into();
        assert!(config.validate().is_err());

        config.location.latitude = Some(52.42);
        config.location.longitude = Some(10.78);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        let config = result.unwrap();
        assert_eq!(config.model.api_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[model]\ntext_model = \"llama-3.3-70b-versatile\"\n\n[storage]\nbackend = \"memory\"\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.model.text_model, "llama-3.3-70b-versatile");
        assert_eq!(config.model.vision_model, "llama-3.2-11b-vision-preview");
        assert_eq!(config.storage.backend, "memory");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[model\n").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_fill_missing_keys() {
        let env: HashMap<&str, &str> = [
            ("GROQ_API_KEY", "gsk-test"),
            ("OPENAI_API_KEY", "sk-ignored"),
            ("VELOCE_VISION_MODEL", "llava"),
            ("TWILIO_PHONE_NUMBER", "+15550100"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.model.api_key.as_deref(), Some("gsk-test"));
        assert_eq!(config.model.vision_model, "llava");
        assert_eq!(config.sos.from_number.as_deref(), Some("+15550100"));
        assert!(!config.sos.is_configured());
    }

    #[test]
    fn env_does_not_replace_file_key() {
        let mut config = AppConfig::default();
        config.model.api_key = Some("from-file".into());
        config.apply_env_overrides(|_| Some("from-env".into()));
        assert_eq!(config.model.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.model.api_key = Some("gsk-secret".into());
        config.sos.auth_token = Some("twilio-secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("gsk-secret"));
        assert!(!debug.contains("twilio-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("llama3-70b-8192"));
        assert!(toml_str.contains("[storage]"));
    }

    #[test]
    fn database_path_defaults_under_config_dir() {
        let storage = StorageConfig::default();
        assert!(storage.database_path().ends_with(".veloce/veloce.db"));
    }
}
