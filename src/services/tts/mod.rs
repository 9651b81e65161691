// TTS services module
// Turns tutor phrases into audio the browser can play

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};
use reqwest::RequestBuilder;
use serde_json::Value;

use crate::config::{AppConfig, OutputFormat, TtsConfig, TtsEngine};
use crate::errors::{AppError, AppResult};
use crate::models::AudioClip;

pub mod audio_format;
pub mod google;
pub mod openai;
pub mod temp;

pub use google::GoogleTranslateTts;
pub use openai::OpenAiTts;
pub use temp::TempAudioFile;

/// Trait that all TTS engines must implement
#[async_trait::async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn engine_name(&self) -> &'static str;

    /// Returns encoded (MP3) audio for `text` spoken in `locale`
    async fn synthesize(&self, text: &str, locale: &str) -> AppResult<Vec<u8>>;
}

/// Get the TTS engine selected in the configuration
pub fn get_speech_synthesizer(config: &AppConfig) -> AppResult<Arc<dyn SpeechSynthesizer>> {
    match config.tts.engine {
        TtsEngine::Google => Ok(Arc::new(GoogleTranslateTts::new(&config.tts)?)),
        TtsEngine::OpenAI => Ok(Arc::new(OpenAiTts::new(&config.openai_api_key, &config.tts)?)),
    }
}

/// Synthesizes speech and converts it to the configured playback format
pub struct SpeechRenderer {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    output_format: OutputFormat,
    sample_rate: u32,
    temp_dir: Option<PathBuf>,
}

impl SpeechRenderer {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, config: &TtsConfig) -> Self {
        Self {
            synthesizer,
            output_format: config.output_format,
            sample_rate: config.sample_rate,
            temp_dir: config.temp_dir.clone(),
        }
    }

    pub async fn render(&self, text: &str, locale: &str) -> AppResult<AudioClip> {
        let text = preprocess_text(text);
        if text.is_empty() {
            return Err(AppError::InvalidInput("nothing to speak".to_string()));
        }

        let encoded = self.synthesizer.synthesize(&text, locale).await.map_err(|e| {
            error!("{} TTS failed for '{}': {}", self.synthesizer.engine_name(), text, e);
            e
        })?;
        if encoded.is_empty() {
            return Err(AppError::SpeechError("engine returned no audio".to_string()));
        }

        match self.output_format {
            OutputFormat::Mp3 => Ok(AudioClip::new(self.output_format.mime(), encoded)),
            OutputFormat::Wav => {
                let temp_dir = self.temp_dir.clone();
                let sample_rate = self.sample_rate;
                let wav = tokio::task::spawn_blocking(move || {
                    convert_via_temp_file(&encoded, temp_dir.as_deref(), sample_rate)
                })
                .await??;
                Ok(AudioClip::new(self.output_format.mime(), wav))
            }
        }
    }
}

/// Stages the MP3 on disk, decodes it and re-encodes to WAV. The staged file is
/// removed whether conversion succeeds or not.
fn convert_via_temp_file(encoded: &[u8], temp_dir: Option<&Path>, sample_rate: u32) -> AppResult<Vec<u8>> {
    let mut staged = TempAudioFile::create(temp_dir, ".mp3")?;
    staged.write_all(encoded)?;

    let converted = audio_format::decode_audio_file(staged.path())
        .and_then(|(samples, rate)| audio_format::to_playback_wav(&samples, rate, sample_rate));

    if let Err(e) = staged.close() {
        warn!("Temp audio cleanup failed: {}", e);
    }
    converted
}

/// Предобрабатывает текст перед отправкой в API TTS
pub fn preprocess_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sends a synthesis request, retrying rate limits, server errors and transport failures.
pub(crate) async fn fetch_audio<F>(engine: &str, max_attempts: u32, make_request: F) -> AppResult<Vec<u8>>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 0;

    loop {
        attempt += 1;
        let retry_wait = Duration::from_millis(500 * 2u64.pow(attempt - 1));

        match make_request().send().await {
            Ok(resp) => {
                let status = resp.status();
                if status.is_success() {
                    let audio = resp
                        .bytes()
                        .await
                        .map_err(|e| AppError::SpeechError(format!("{} TTS body read failed: {}", engine, e)))?
                        .to_vec();
                    info!("{} TTS returned {} bytes", engine, audio.len());
                    return Ok(audio);
                }

                let error_text = resp.text().await.unwrap_or_default();
                let message = serde_json::from_str::<Value>(&error_text)
                    .ok()
                    .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
                    .unwrap_or(error_text);
                error!("{} TTS error (status {}): {}", engine, status, message);

                let retryable = status.as_u16() == 429 || status.is_server_error();
                if retryable && attempt < max_attempts {
                    warn!("Retrying {} TTS in {} ms...", engine, retry_wait.as_millis());
                    tokio::time::sleep(retry_wait).await;
                    continue;
                }
                return Err(AppError::SpeechError(format!(
                    "{} TTS HTTP {}: {}",
                    engine,
                    status,
                    message.trim()
                )));
            }
            Err(e) => {
                error!("{} TTS request failed: {}", engine, e);
                if attempt < max_attempts {
                    warn!("Retrying {} TTS in {} ms...", engine, retry_wait.as_millis());
                    tokio::time::sleep(retry_wait).await;
                    continue;
                }
                return Err(AppError::SpeechError(format!("{} TTS unreachable: {}", engine, e)));
            }
        }
    }
}
