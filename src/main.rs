use std::sync::Arc;

use anyhow::Context;
use log::info;

use language_tutor::utils::logger::init_logger;
use language_tutor::{AppConfig, AppState, web};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Инициализируем логгер
    init_logger();

    let config = AppConfig::from_env().context("failed to load configuration")?;
    info!(
        "Starting language tutor (model {}, {:?} speech as {:?})",
        config.chat_model, config.tts.engine, config.tts.output_format
    );

    let state = AppState::from_config(config).context("failed to initialize service clients")?;
    web::serve(Arc::new(state)).await.context("HTTP server failed")?;
    Ok(())
}
