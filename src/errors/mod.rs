// Error handling module
// Contains the application error type shared by every layer

use thiserror::Error;
use uuid::Uuid;

// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Speech synthesis error: {0}")]
    SpeechError(String),

    #[error("Audio processing error: {0}")]
    AudioProcessingError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::ApiError(format!("request timed out: {}", err))
        } else {
            AppError::ApiError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::SerializationError(err.to_string())
    }
}

impl From<hound::Error> for AppError {
    fn from(err: hound::Error) -> Self {
        AppError::AudioProcessingError(format!("WAV encoding failed: {}", err))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::AudioProcessingError(format!("audio worker failed: {}", err))
    }
}

// Result type alias for application
pub type AppResult<T> = Result<T, AppError>;
