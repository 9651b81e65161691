use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

pub const GOOGLE_TTS_BASE_URL: &str = "https://translate.google.com";
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

// Доступные движки TTS
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TtsEngine {
    #[default]
    Google,
    OpenAI,
}

impl FromStr for TtsEngine {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" | "gtts" => Ok(TtsEngine::Google),
            "openai" => Ok(TtsEngine::OpenAI),
            other => Err(AppError::ConfigurationError(format!(
                "Unsupported TTS engine: {}",
                other
            ))),
        }
    }
}

/// Audio container handed to the browser
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Mono 16-bit PCM WAV at `TtsConfig::sample_rate`
    #[default]
    Wav,
    /// Engine output passed through untouched
    Mp3,
}

impl OutputFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "wav" => Ok(OutputFormat::Wav),
            "mp3" => Ok(OutputFormat::Mp3),
            other => Err(AppError::ConfigurationError(format!(
                "Unsupported audio format: {}",
                other
            ))),
        }
    }
}

// Конфигурация TTS
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtsConfig {
    pub engine: TtsEngine,
    /// Overrides the engine's default endpoint
    pub base_url: Option<String>,
    pub output_format: OutputFormat,
    pub sample_rate: u32,
    pub timeout: Duration,
    /// Attempts per synthesis request, including the first one
    pub max_attempts: u32,

    // OpenAI настройки
    pub openai_model: String,
    pub openai_voice: String,
    pub openai_speed: f32,

    /// Where synthesized audio is staged before conversion
    pub temp_dir: Option<PathBuf>,
}

impl TtsConfig {
    pub fn resolved_base_url(&self) -> &str {
        match (&self.base_url, self.engine) {
            (Some(url), _) => url.trim_end_matches('/'),
            (None, TtsEngine::Google) => GOOGLE_TTS_BASE_URL,
            (None, TtsEngine::OpenAI) => OPENAI_BASE_URL,
        }
    }
}

impl Default for TtsConfig {
    fn default() -> Self {
        TtsConfig {
            engine: TtsEngine::default(),
            base_url: None,
            output_format: OutputFormat::default(),
            sample_rate: 16_000,
            timeout: Duration::from_secs(30),
            max_attempts: 3,
            openai_model: "tts-1".to_string(),
            openai_voice: "alloy".to_string(),
            openai_speed: 1.0,
            temp_dir: None,
        }
    }
}
