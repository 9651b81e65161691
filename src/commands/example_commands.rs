use log::debug;
use uuid::Uuid;

use super::AppState;
use crate::errors::{AppError, AppResult};
use crate::models::examples::is_known_example;
use crate::session::SessionView;

/// Put a quick-example phrase into the input slot. It is used by the next submission only.
pub async fn select_example(state: &AppState, id: Uuid, phrase: &str) -> AppResult<SessionView> {
    let phrase = phrase.trim();
    if phrase.is_empty() {
        return Err(AppError::InvalidInput("example phrase is empty".to_string()));
    }
    if !is_known_example(phrase) {
        return Err(AppError::InvalidInput(format!("unknown example phrase: {}", phrase)));
    }

    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.touch();
    session.select_example(phrase);
    debug!("Session {} selected example '{}'", id, phrase);
    Ok(SessionView::from(&*session))
}
