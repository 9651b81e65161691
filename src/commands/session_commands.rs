use log::info;
use uuid::Uuid;

use super::AppState;
use crate::errors::AppResult;
use crate::models::LearningSettings;
use crate::session::SessionView;

/// Start a session. Settings default to Spanish / Beginner with every component shown.
pub async fn create_session(state: &AppState, settings: Option<LearningSettings>) -> AppResult<SessionView> {
    let handle = state.sessions.create(settings.unwrap_or_default()).await;
    let session = handle.lock().await;
    Ok(SessionView::from(&*session))
}

pub async fn get_session(state: &AppState, id: Uuid) -> AppResult<SessionView> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.touch();
    Ok(SessionView::from(&*session))
}

/// Change language, level or display options. Takes effect from the next message;
/// turns already recorded are kept.
pub async fn update_settings(state: &AppState, id: Uuid, settings: LearningSettings) -> AppResult<SessionView> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.touch();
    if session.settings != settings {
        info!(
            "Session {} now practising {} at {} level",
            id,
            settings.language.name(),
            settings.level.name()
        );
        session.settings = settings;
    }
    Ok(SessionView::from(&*session))
}

/// Clear Chat
pub async fn clear_chat(state: &AppState, id: Uuid) -> AppResult<SessionView> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.touch();
    session.clear();
    info!("Session {} chat cleared", id);
    Ok(SessionView::from(&*session))
}

pub async fn end_session(state: &AppState, id: Uuid) -> AppResult<()> {
    state.sessions.remove(id).await
}
