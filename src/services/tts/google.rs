//! Google Translate TTS, the engine behind gTTS.
//!
//! The endpoint accepts at most 100 characters per request, so longer text is
//! split on whitespace and the returned MP3 parts are concatenated.

use log::{debug, info};
use reqwest::Client;
use reqwest::header;

use super::{SpeechSynthesizer, fetch_audio};
use crate::config::TtsConfig;
use crate::errors::AppResult;

pub const MAX_CHUNK_CHARS: usize = 100;

pub struct GoogleTranslateTts {
    client: Client,
    base_url: String,
    max_attempts: u32,
}

impl GoogleTranslateTts {
    pub fn new(config: &TtsConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko)")
            .build()?;

        Ok(Self {
            client,
            base_url: config.resolved_base_url().to_string(),
            max_attempts: config.max_attempts.max(1),
        })
    }
}

#[async_trait::async_trait]
impl SpeechSynthesizer for GoogleTranslateTts {
    fn engine_name(&self) -> &'static str {
        "google"
    }

    async fn synthesize(&self, text: &str, locale: &str) -> AppResult<Vec<u8>> {
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        let total = chunks.len().to_string();
        let url = format!("{}/translate_tts", self.base_url);
        let mut audio = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            debug!("Google TTS chunk {}/{} ({}): '{}'", idx + 1, chunks.len(), locale, chunk);
            let idx = idx.to_string();
            let textlen = chunk.chars().count().to_string();

            let part = fetch_audio(self.engine_name(), self.max_attempts, || {
                self.client
                    .get(&url)
                    .header(header::REFERER, "https://translate.google.com/")
                    .query(&[
                        ("ie", "UTF-8"),
                        ("q", chunk.as_str()),
                        ("tl", locale),
                        ("client", "tw-ob"),
                        ("total", total.as_str()),
                        ("idx", idx.as_str()),
                        ("textlen", textlen.as_str()),
                    ])
            })
            .await?;
            audio.extend_from_slice(&part);
        }

        info!("Google TTS produced {} bytes for {} chunk(s)", audio.len(), chunks.len());
        Ok(audio)
    }
}

/// Splits text into pieces of at most `max_chars` characters, preferring word boundaries.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
