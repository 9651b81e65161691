use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Json;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use serde_json::{Value, json};

use super::completion::{ChatCompletion, CompletionRequest, OpenAiChatClient, reply_or_error};
use super::tts::{GoogleTranslateTts, OpenAiTts, SpeechRenderer, SpeechSynthesizer};
use crate::config::{AppConfig, OutputFormat, ReplyFormat, TtsConfig, TtsEngine};
use crate::errors::AppError;
use crate::models::Turn;
use crate::testing::{RecordingSynth, spawn_server, tone_wav};

type Captured = Arc<Mutex<Vec<Value>>>;

async fn chat_server(reply: Value, status: StatusCode) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route(
            "/chat/completions",
            post(
                move |State(captured): State<Captured>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        captured.lock().unwrap().push(body);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(captured.clone());
    (spawn_server(router).await, captured)
}

fn chat_config(base_url: &str, format: ReplyFormat) -> AppConfig {
    AppConfig {
        openai_api_key: "sk-test".to_string(),
        openai_base_url: base_url.to_string(),
        reply_format: format,
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn test_completion_unescapes_and_orders_messages() {
    let reply = json!({
        "choices": [{ "message": { "content": "Response: Hola\\nTranslation: Hello\\n" } }]
    });
    let (base_url, captured) = chat_server(reply, StatusCode::OK).await;
    let client = OpenAiChatClient::new(&chat_config(&base_url, ReplyFormat::Lines)).unwrap();

    let history = vec![Turn::user("Hi"), Turn::assistant("Response: ¡Hola!")];
    let request = CompletionRequest {
        system_prompt: "You are a tutor",
        history: &history,
        user_message: "Hello",
    };
    let text = client.complete(&request).await.unwrap();
    assert_eq!(text, "Response: Hola\nTranslation: Hello\n");

    let bodies = captured.lock().unwrap();
    let body = &bodies[0];
    assert_eq!(body["model"], "gpt-4-turbo-preview");
    assert!((body["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    assert!(body.get("response_format").is_none());

    let roles: Vec<&str> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, ["system", "user", "assistant", "user"]);
    assert_eq!(body["messages"][3]["content"], "Hello");
}

#[tokio::test]
async fn test_completion_error_carries_provider_message() {
    let reply = json!({ "error": { "message": "Incorrect API key provided" } });
    let (base_url, _) = chat_server(reply, StatusCode::UNAUTHORIZED).await;
    let client = OpenAiChatClient::new(&chat_config(&base_url, ReplyFormat::Lines)).unwrap();

    let request = CompletionRequest {
        system_prompt: "prompt",
        history: &[],
        user_message: "Hello",
    };
    match client.complete(&request).await {
        Err(AppError::ApiError(message)) => {
            assert!(message.contains("401"));
            assert!(message.contains("Incorrect API key provided"));
        }
        other => panic!("expected ApiError, got {:?}", other),
    }
}

#[tokio::test]
async fn test_structured_reply_rendered_as_lines() {
    let content = json!({
        "response": "Bonjour",
        "pronunciation": "bohn-ZHOOR",
        "translation": "Hello",
        "corrections": null
    })
    .to_string();
    let reply = json!({ "choices": [{ "message": { "content": content } }] });
    let (base_url, captured) = chat_server(reply, StatusCode::OK).await;
    let client = OpenAiChatClient::new(&chat_config(&base_url, ReplyFormat::Json)).unwrap();

    let request = CompletionRequest {
        system_prompt: "prompt",
        history: &[],
        user_message: "Hello",
    };
    let text = client.complete(&request).await.unwrap();
    assert_eq!(
        text,
        "Response: Bonjour\n(Pronunciation: bohn-ZHOOR)\nTranslation: Hello"
    );
    assert_eq!(
        captured.lock().unwrap()[0]["response_format"]["type"],
        "json_schema"
    );
}

#[tokio::test]
async fn test_google_tts_chunks_long_text() {
    let queries: Arc<Mutex<Vec<HashMap<String, String>>>> = Arc::new(Mutex::new(Vec::new()));
    let router = Router::new()
        .route(
            "/translate_tts",
            get(
                |State(queries): State<Arc<Mutex<Vec<HashMap<String, String>>>>>,
                 Query(query): Query<HashMap<String, String>>| async move {
                    let idx = query["idx"].clone();
                    queries.lock().unwrap().push(query);
                    format!("part{}", idx).into_bytes()
                },
            ),
        )
        .with_state(queries.clone());
    let base_url = spawn_server(router).await;

    let config = TtsConfig {
        base_url: Some(base_url),
        ..TtsConfig::default()
    };
    let engine = GoogleTranslateTts::new(&config).unwrap();
    let text = "palabra ".repeat(20);
    let audio = engine.synthesize(text.trim(), "es").await.unwrap();

    assert_eq!(audio, b"part0part1".to_vec());
    let queries = queries.lock().unwrap();
    assert_eq!(queries.len(), 2);
    for (idx, query) in queries.iter().enumerate() {
        assert_eq!(query["tl"], "es");
        assert_eq!(query["client"], "tw-ob");
        assert_eq!(query["ie"], "UTF-8");
        assert_eq!(query["total"], "2");
        assert_eq!(query["idx"], idx.to_string());
        assert!(query["q"].chars().count() <= 100);
        assert_eq!(query["textlen"], query["q"].chars().count().to_string());
    }
}

async fn speech_server(failures_before_success: usize) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route(
            "/audio/speech",
            post(
                move |State(hits): State<Arc<AtomicUsize>>, Json(body): Json<Value>| async move {
                    assert_eq!(body["response_format"], "mp3");
                    let attempt = hits.fetch_add(1, Ordering::SeqCst);
                    if attempt < failures_before_success {
                        (
                            StatusCode::INTERNAL_SERVER_ERROR,
                            json!({ "error": { "message": "overloaded" } }).to_string().into_bytes(),
                        )
                    } else {
                        (StatusCode::OK, b"ID3audio".to_vec())
                    }
                },
            ),
        )
        .with_state(hits.clone());
    (spawn_server(router).await, hits)
}

fn openai_tts_config(base_url: String, max_attempts: u32) -> TtsConfig {
    TtsConfig {
        engine: TtsEngine::OpenAI,
        base_url: Some(base_url),
        max_attempts,
        ..TtsConfig::default()
    }
}

#[tokio::test]
async fn test_openai_tts_server_error_surfaces() {
    let (base_url, hits) = speech_server(usize::MAX).await;
    let engine = OpenAiTts::new("sk-test", &openai_tts_config(base_url, 1)).unwrap();

    match engine.synthesize("Hola", "es").await {
        Err(AppError::SpeechError(message)) => assert!(message.contains("overloaded")),
        other => panic!("expected SpeechError, got {:?}", other),
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_openai_tts_retries_server_errors() {
    let (base_url, hits) = speech_server(1).await;
    let engine = OpenAiTts::new("sk-test", &openai_tts_config(base_url, 2)).unwrap();

    let audio = tokio_test::assert_ok!(engine.synthesize("Hola", "es").await);
    assert_eq!(audio, b"ID3audio".to_vec());
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

fn renderer_in(dir: &std::path::Path, synth: Arc<RecordingSynth>, format: OutputFormat) -> SpeechRenderer {
    let config = TtsConfig {
        output_format: format,
        temp_dir: Some(dir.to_path_buf()),
        ..TtsConfig::default()
    };
    SpeechRenderer::new(synth, &config)
}

fn is_empty_dir(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}

#[tokio::test]
async fn test_render_converts_and_cleans_up() {
    let dir = tempfile::tempdir().unwrap();
    let synth = RecordingSynth::returning(tone_wav(44_100, 2, 0.25));
    let renderer = renderer_in(dir.path(), synth.clone(), OutputFormat::Wav);

    let clip = renderer.render("  Hola \n", "es").await.unwrap();
    assert_eq!(clip.mime, "audio/wav");
    assert_eq!(synth.calls(), vec![("Hola".to_string(), "es".to_string())]);

    let reader = hound::WavReader::new(std::io::Cursor::new(clip.bytes)).unwrap();
    assert_eq!(reader.spec().channels, 1);
    assert_eq!(reader.spec().sample_rate, 16_000);
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn test_render_synthesis_failure_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = renderer_in(dir.path(), RecordingSynth::failing(), OutputFormat::Wav);

    let result = renderer.render("Hola", "es").await;
    tokio_test::assert_err!(&result);
    assert!(matches!(result, Err(AppError::SpeechError(_))));
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn test_render_conversion_failure_leaves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let synth = RecordingSynth::returning(b"definitely not audio".to_vec());
    let renderer = renderer_in(dir.path(), synth, OutputFormat::Wav);

    let result = renderer.render("Hola", "es").await;
    assert!(matches!(result, Err(AppError::AudioProcessingError(_))));
    assert!(is_empty_dir(dir.path()));
}

#[tokio::test]
async fn test_render_mp3_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    let synth = RecordingSynth::returning(b"ID3audio".to_vec());
    let renderer = renderer_in(dir.path(), synth, OutputFormat::Mp3);

    let clip = renderer.render("Hola", "es").await.unwrap();
    assert_eq!(clip.mime, "audio/mpeg");
    assert_eq!(clip.bytes, b"ID3audio".to_vec());
}

#[tokio::test]
async fn test_render_rejects_blank_text() {
    let synth = RecordingSynth::working();
    let renderer = SpeechRenderer::new(synth.clone(), &TtsConfig::default());

    assert!(matches!(
        renderer.render(" \n\t", "es").await,
        Err(AppError::InvalidInput(_))
    ));
    assert!(synth.calls().is_empty());
}

/// Accepts the request and never answers within the client's deadline
async fn stalled_server(path: &str) -> String {
    let stall = || async {
        tokio::time::sleep(Duration::from_secs(30)).await;
        StatusCode::OK
    };
    let router = Router::new().route(path, get(stall).post(stall));
    spawn_server(router).await
}

#[tokio::test]
async fn test_completion_timeout_becomes_error_reply() {
    let base_url = stalled_server("/chat/completions").await;
    let config = AppConfig {
        completion_timeout: Duration::from_secs(1),
        ..chat_config(&base_url, ReplyFormat::Lines)
    };
    let client = OpenAiChatClient::new(&config).unwrap();
    let request = CompletionRequest {
        system_prompt: "prompt",
        history: &[],
        user_message: "Hello",
    };

    let started = Instant::now();
    let reply = reply_or_error(&client, &request).await;

    assert!(reply.starts_with("Error: "), "unexpected reply: {}", reply);
    assert!(reply.contains("timed out"));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_stalled_speech_engine_times_out() {
    let base_url = stalled_server("/translate_tts").await;
    let config = TtsConfig {
        base_url: Some(base_url),
        timeout: Duration::from_secs(1),
        max_attempts: 1,
        ..TtsConfig::default()
    };
    let engine = GoogleTranslateTts::new(&config).unwrap();

    let started = Instant::now();
    let result = engine.synthesize("Hola", "es").await;

    assert!(matches!(result, Err(AppError::SpeechError(_))), "got {:?}", result);
    assert!(started.elapsed() < Duration::from_secs(10));
}
