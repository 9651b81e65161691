use std::time::{Duration, Instant};

use log::{debug, error, info};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{ChatCompletion, CompletionRequest, StructuredReply};
use crate::config::{AppConfig, ReplyFormat};
use crate::errors::{AppError, AppResult};
use crate::services::reply::unescape_newlines;

// Chat message structure for OpenAI API
#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

// OpenAI API request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

// OpenAI API response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible `/chat/completions` endpoint
pub struct OpenAiChatClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    reply_format: ReplyFormat,
}

impl OpenAiChatClient {
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        if config.openai_api_key.is_empty() {
            return Err(AppError::ConfigurationError(
                "OpenAI API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.completion_timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("language-tutor/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_key: config.openai_api_key.clone(),
            base_url: config.openai_base_url.trim_end_matches('/').to_string(),
            model: config.chat_model.clone(),
            temperature: config.temperature,
            reply_format: config.reply_format,
        })
    }

    fn build_request(&self, request: &CompletionRequest<'_>) -> ChatRequest {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(Message {
            role: "system".to_string(),
            content: request.system_prompt.to_string(),
        });
        messages.extend(request.history.iter().map(|turn| Message {
            role: turn.role().as_str().to_string(),
            content: turn.content().to_string(),
        }));
        messages.push(Message {
            role: "user".to_string(),
            content: request.user_message.to_string(),
        });

        let response_format = match self.reply_format {
            ReplyFormat::Lines => None,
            ReplyFormat::Json => Some(reply_schema()),
        };

        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            response_format,
        }
    }
}

#[async_trait::async_trait]
impl ChatCompletion for OpenAiChatClient {
    async fn complete(&self, request: &CompletionRequest<'_>) -> AppResult<String> {
        let body = self.build_request(request);
        debug!(
            "Sending chat completion request: model={}, {} messages",
            body.model,
            body.messages.len()
        );

        let started = Instant::now();
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        info!(
            "Chat completion responded {} in {} ms",
            status,
            started.elapsed().as_millis()
        );

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("OpenAI API error: HTTP {}, body: {}", status, error_text);
            return Err(AppError::ApiError(format!(
                "HTTP {}: {}",
                status,
                provider_message(&error_text)
            )));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| AppError::ApiError("completion returned no message".to_string()))?;

        match self.reply_format {
            ReplyFormat::Lines => Ok(unescape_newlines(&content)),
            ReplyFormat::Json => {
                let reply: StructuredReply = serde_json::from_str(&content)?;
                Ok(reply.to_lines())
            }
        }
    }
}

/// Pulls `error.message` out of an OpenAI error body, or returns the body as is.
fn provider_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

fn reply_schema() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "tutor_reply",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "response": { "type": "string" },
                    "pronunciation": { "type": ["string", "null"] },
                    "translation": { "type": ["string", "null"] },
                    "corrections": { "type": ["string", "null"] }
                },
                "required": ["response", "pronunciation", "translation", "corrections"],
                "additionalProperties": false
            }
        }
    })
}
