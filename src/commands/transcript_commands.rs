use chrono::Local;
use log::info;
use uuid::Uuid;

use super::AppState;
use crate::errors::AppResult;
use crate::services::transcript::{Transcript, export_transcript};

/// Save Chat: renders the current turns as a downloadable text file
pub async fn save_chat(state: &AppState, id: Uuid) -> AppResult<Transcript> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.touch();

    let transcript = export_transcript(session.turns(), Local::now())?;
    info!(
        "Session {} exported {} turn(s) as {}",
        id,
        session.turns().len(),
        transcript.file_name
    );
    Ok(transcript)
}
