// Chat completion module
// Talks to the tutor model and returns the reply text ready for parsing

use log::warn;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;
use crate::models::Turn;

pub mod openai;

pub use openai::OpenAiChatClient;

/// Everything the model needs for one tutor reply
#[derive(Debug, Clone)]
pub struct CompletionRequest<'a> {
    pub system_prompt: &'a str,
    pub history: &'a [Turn],
    pub user_message: &'a str,
}

/// Trait that every chat completion backend must implement
#[async_trait::async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Returns the reply with real line breaks between components
    async fn complete(&self, request: &CompletionRequest<'_>) -> AppResult<String>;
}

/// Structured reply negotiated through the JSON response format
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StructuredReply {
    pub response: String,
    #[serde(default)]
    pub pronunciation: Option<String>,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub corrections: Option<String>,
}

impl StructuredReply {
    /// Renders the reply in the same line layout the text format uses.
    pub fn to_lines(&self) -> String {
        let mut lines = vec![format!("Response: {}", self.response.trim())];
        let present = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        if let Some(pronunciation) = present(&self.pronunciation) {
            lines.push(format!("(Pronunciation: {})", pronunciation));
        }
        if let Some(translation) = present(&self.translation) {
            lines.push(format!("Translation: {}", translation));
        }
        if let Some(corrections) = present(&self.corrections) {
            lines.push(format!("Corrections: {}", corrections));
        }
        lines.join("\n")
    }
}

/// Asks for a reply and folds any failure into an inline `Error: ...` text.
pub async fn reply_or_error(client: &dyn ChatCompletion, request: &CompletionRequest<'_>) -> String {
    match client.complete(request).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Tutor reply failed: {}", e);
            format!("Error: {}", e)
        }
    }
}
