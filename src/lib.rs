//! Language tutor: a browser chat with an LLM tutor persona that answers in the
//! chosen language and reads its phrases aloud.

pub mod commands;
pub mod config;
pub mod errors;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

pub use commands::AppState;
pub use config::AppConfig;
pub use errors::{AppError, AppResult};
