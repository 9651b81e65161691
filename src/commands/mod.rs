// User actions, one function per action. The HTTP layer is a thin shell over these.
pub mod chat_commands;
pub mod example_commands;
pub mod options_commands;
pub mod session_commands;
pub mod transcript_commands;

// Re-export functions from modules
pub use chat_commands::*;
pub use example_commands::*;
pub use options_commands::*;
pub use session_commands::*;
pub use transcript_commands::*;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::errors::AppResult;
use crate::services::completion::{ChatCompletion, OpenAiChatClient};
use crate::services::tts::{SpeechRenderer, SpeechSynthesizer, get_speech_synthesizer};
use crate::session::SessionStore;

/// Shared application state handed to every command
pub struct AppState {
    pub config: AppConfig,
    pub completion: Arc<dyn ChatCompletion>,
    pub speech: SpeechRenderer,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        completion: Arc<dyn ChatCompletion>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        let speech = SpeechRenderer::new(synthesizer, &config.tts);
        Self {
            config,
            completion,
            speech,
            sessions: SessionStore::new(),
        }
    }

    /// Wires the HTTP-backed clients selected in the configuration
    pub fn from_config(config: AppConfig) -> AppResult<Self> {
        let completion = Arc::new(OpenAiChatClient::new(&config)?);
        let synthesizer = get_speech_synthesizer(&config)?;
        Ok(Self::new(config, completion, synthesizer))
    }
}
