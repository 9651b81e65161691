// Configuration module
// Centralized management of application configuration

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

pub mod tts; // TTS configuration

pub use tts::{OutputFormat, TtsConfig, TtsEngine};

/// Env file read from the working directory at startup
pub const DOTENV_FILE: &str = ".env";

/// How the tutor is asked to lay out its reply
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReplyFormat {
    /// `Response: ...\n` lines separated by an escaped newline token
    #[default]
    Lines,
    /// JSON object negotiated through `response_format`
    Json,
}

impl FromStr for ReplyFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lines" | "text" => Ok(ReplyFormat::Lines),
            "json" => Ok(ReplyFormat::Json),
            other => Err(AppError::ConfigurationError(format!(
                "Unsupported reply format: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(skip_serializing)]
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub bind_addr: SocketAddr,
    pub chat_model: String,
    pub temperature: f32,
    pub reply_format: ReplyFormat,
    pub completion_timeout: Duration,
    pub session_ttl: Duration,
    pub asset_dir: PathBuf,
    /// Speak the learner's own message back in English
    pub speak_user_turns: bool,
    pub tts: TtsConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: tts::OPENAI_BASE_URL.to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8501)),
            chat_model: "gpt-4-turbo-preview".to_string(),
            temperature: 0.7,
            reply_format: ReplyFormat::default(),
            completion_timeout: Duration::from_secs(60),
            session_ttl: Duration::from_secs(3600),
            asset_dir: PathBuf::from("."),
            speak_user_turns: true,
            tts: TtsConfig::default(),
        }
    }
}

impl AppConfig {
    /// Reads the configuration from `.env` and the process environment.
    /// Keys set in the file win over the process environment.
    pub fn from_env() -> AppResult<Self> {
        Self::from_file_and_lookup(Path::new(DOTENV_FILE), |key| std::env::var(key).ok())
    }

    /// Layers a dotenv file over `lookup`. A missing file leaves `lookup` alone.
    pub fn from_file_and_lookup<F>(path: &Path, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = read_env_file(path)?;
        Self::from_lookup(|key| file.get(key).cloned().or_else(|| lookup(key)))
    }

    /// Builds the configuration from any key/value source. Unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = AppConfig::default();

        config.openai_api_key = get("OPENAI_API_KEY").ok_or_else(|| {
            AppError::ConfigurationError("OPENAI_API_KEY is not set".to_string())
        })?;

        if let Some(url) = get("OPENAI_BASE_URL") {
            config.openai_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(addr) = get("TUTOR_BIND_ADDR") {
            config.bind_addr = parse_value("TUTOR_BIND_ADDR", &addr)?;
        }
        if let Some(model) = get("TUTOR_CHAT_MODEL") {
            config.chat_model = model;
        }
        if let Some(temperature) = get("TUTOR_TEMPERATURE") {
            config.temperature = parse_value("TUTOR_TEMPERATURE", &temperature)?;
            if !(0.0..=2.0).contains(&config.temperature) {
                return Err(AppError::ConfigurationError(format!(
                    "TUTOR_TEMPERATURE must be between 0 and 2, got {}",
                    config.temperature
                )));
            }
        }
        if let Some(format) = get("TUTOR_REPLY_FORMAT") {
            config.reply_format = format.parse()?;
        }
        if let Some(secs) = get("TUTOR_COMPLETION_TIMEOUT_SECS") {
            config.completion_timeout = parse_secs("TUTOR_COMPLETION_TIMEOUT_SECS", &secs)?;
        }
        if let Some(secs) = get("TUTOR_SESSION_TTL_SECS") {
            config.session_ttl = parse_secs("TUTOR_SESSION_TTL_SECS", &secs)?;
        }
        if let Some(dir) = get("TUTOR_ASSET_DIR") {
            config.asset_dir = PathBuf::from(dir);
        }
        if let Some(flag) = get("TUTOR_SPEAK_USER_TURNS") {
            config.speak_user_turns = parse_flag("TUTOR_SPEAK_USER_TURNS", &flag)?;
        }

        // TTS
        if let Some(engine) = get("TUTOR_TTS_ENGINE") {
            config.tts.engine = engine.parse()?;
        }
        config.tts.base_url = get("TUTOR_TTS_BASE_URL");
        if config.tts.base_url.is_none() && config.tts.engine == TtsEngine::OpenAI {
            config.tts.base_url = Some(config.openai_base_url.clone());
        }
        if let Some(format) = get("TUTOR_TTS_FORMAT") {
            config.tts.output_format = format.parse()?;
        }
        if let Some(rate) = get("TUTOR_TTS_SAMPLE_RATE") {
            config.tts.sample_rate = parse_value("TUTOR_TTS_SAMPLE_RATE", &rate)?;
            if config.tts.sample_rate == 0 {
                return Err(AppError::ConfigurationError(
                    "TUTOR_TTS_SAMPLE_RATE must be positive".to_string(),
                ));
            }
        }
        if let Some(secs) = get("TUTOR_TTS_TIMEOUT_SECS") {
            config.tts.timeout = parse_secs("TUTOR_TTS_TIMEOUT_SECS", &secs)?;
        }
        if let Some(voice) = get("TUTOR_TTS_VOICE") {
            config.tts.openai_voice = voice;
        }
        if let Some(model) = get("TUTOR_TTS_MODEL") {
            config.tts.openai_model = model;
        }
        config.tts.temp_dir = get("TUTOR_TEMP_DIR").map(PathBuf::from);

        Ok(config)
    }

    pub fn app_image_path(&self) -> PathBuf {
        self.asset_dir.join("AppImage.png")
    }
}

fn read_env_file(path: &Path) -> AppResult<HashMap<String, String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(e) if e.not_found() => {
            debug!("No env file at {}", path.display());
            return Ok(HashMap::new());
        }
        Err(e) => {
            return Err(AppError::ConfigurationError(format!(
                "Cannot read {}: {}",
                path.display(),
                e
            )));
        }
    };

    let vars: HashMap<String, String> = entries
        .map(|entry| {
            entry.map_err(|e| {
                AppError::ConfigurationError(format!("Invalid line in {}: {}", path.display(), e))
            })
        })
        .collect::<AppResult<_>>()?;
    debug!("Loaded {} variable(s) from {}", vars.len(), path.display());
    Ok(vars)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| AppError::ConfigurationError(format!("Invalid {}='{}': {}", key, raw, e)))
}

fn parse_secs(key: &str, raw: &str) -> AppResult<Duration> {
    let secs: u64 = parse_value(key, raw)?;
    if secs == 0 {
        return Err(AppError::ConfigurationError(format!(
            "{} must be at least 1 second",
            key
        )));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_flag(key: &str, raw: &str) -> AppResult<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(AppError::ConfigurationError(format!(
            "Invalid {}='{}': expected true or false",
            key, raw
        ))),
    }
}
