use log::debug;
use reqwest::Client;
use serde::Serialize;

use super::{SpeechSynthesizer, fetch_audio};
use crate::config::TtsConfig;
use crate::errors::{AppError, AppResult};

/// Параметры запроса к API OpenAI TTS
#[derive(Debug, Serialize)]
struct TtsRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'a str,
}

/// Клиент для работы с OpenAI TTS API
pub struct OpenAiTts {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    voice: String,
    speed: f32,
    max_attempts: u32,
}

impl OpenAiTts {
    pub fn new(api_key: &str, config: &TtsConfig) -> AppResult<Self> {
        if api_key.is_empty() {
            return Err(AppError::ConfigurationError(
                "OpenAI API key is required".to_string(),
            ));
        }
        if !(0.25..=4.0).contains(&config.openai_speed) {
            return Err(AppError::ConfigurationError(format!(
                "OpenAI TTS speed must be within 0.25..=4.0, got {}",
                config.openai_speed
            )));
        }

        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: config.resolved_base_url().to_string(),
            model: config.openai_model.clone(),
            voice: config.openai_voice.clone(),
            speed: config.openai_speed,
            max_attempts: config.max_attempts.max(1),
        })
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for OpenAiTts {
    fn engine_name(&self) -> &'static str {
        "openai"
    }

    /// Модель сама определяет язык текста, поэтому локаль только логируется
    async fn synthesize(&self, text: &str, locale: &str) -> AppResult<Vec<u8>> {
        debug!("OpenAI TTS request ({}, voice {}): '{}'", locale, self.voice, text);

        let request_body = TtsRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
            response_format: "mp3",
        };
        let url = format!("{}/audio/speech", self.base_url);

        fetch_audio(self.engine_name(), self.max_attempts, || {
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request_body)
        })
        .await
    }
}
