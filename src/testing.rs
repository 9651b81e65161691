//! Test doubles shared by unit and HTTP tests.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::Router;
use hound::{SampleFormat, WavSpec, WavWriter};
use tokio::net::TcpListener;

use crate::commands::AppState;
use crate::config::AppConfig;
use crate::errors::{AppError, AppResult};
use crate::services::completion::{ChatCompletion, CompletionRequest};
use crate::services::tts::SpeechSynthesizer;

/// Short 440 Hz tone encoded as 16-bit WAV
pub fn tone_wav(rate: u32, channels: u16, seconds: f32) -> Vec<u8> {
    let spec = WavSpec {
        channels,
        sample_rate: rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let count = (rate as f32 * seconds) as usize;
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..count {
            let value = (2.0 * std::f32::consts::PI * 440.0 * i as f32 / rate as f32).sin() * 0.5;
            for _ in 0..channels {
                writer.write_sample((value * i16::MAX as f32) as i16).unwrap();
            }
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// What a completion call saw
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub system_prompt: String,
    pub history_len: usize,
    pub user_message: String,
}

/// Returns a fixed reply (or error) and records every request
pub struct ScriptedCompletion {
    reply: Result<String, String>,
    pub requests: Mutex<Vec<CapturedRequest>>,
}

impl ScriptedCompletion {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(reply.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn captured(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ChatCompletion for ScriptedCompletion {
    async fn complete(&self, request: &CompletionRequest<'_>) -> AppResult<String> {
        self.requests.lock().unwrap().push(CapturedRequest {
            system_prompt: request.system_prompt.to_string(),
            history_len: request.history.len(),
            user_message: request.user_message.to_string(),
        });
        self.reply.clone().map_err(AppError::ApiError)
    }
}

/// Records `(text, locale)` pairs and answers with a WAV tone or an error
pub struct RecordingSynth {
    audio: Option<Vec<u8>>,
    pub calls: Mutex<Vec<(String, String)>>,
}

impl RecordingSynth {
    pub fn working() -> Arc<Self> {
        Arc::new(Self {
            audio: Some(tone_wav(22_050, 1, 0.2)),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn returning(audio: Vec<u8>) -> Arc<Self> {
        Arc::new(Self {
            audio: Some(audio),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            audio: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for RecordingSynth {
    fn engine_name(&self) -> &'static str {
        "recording"
    }

    async fn synthesize(&self, text: &str, locale: &str) -> AppResult<Vec<u8>> {
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), locale.to_string()));
        self.audio
            .clone()
            .ok_or_else(|| AppError::SpeechError("engine unavailable".to_string()))
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        openai_api_key: "sk-test".to_string(),
        speak_user_turns: false,
        ..AppConfig::default()
    }
}

pub fn test_state(
    config: AppConfig,
    completion: Arc<ScriptedCompletion>,
    synth: Arc<RecordingSynth>,
) -> AppState {
    AppState::new(config, completion, synth)
}

/// Serves `router` on an ephemeral local port and returns its base URL
pub async fn spawn_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}
