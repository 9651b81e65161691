use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use super::AppState;
use crate::config::ReplyFormat;
use crate::errors::{AppError, AppResult};
use crate::models::language::FALLBACK_LOCALE;
use crate::models::{AudioClip, Turn};
use crate::services::completion::{CompletionRequest, reply_or_error};
use crate::services::prompt::{build_structured_prompt, build_system_prompt};
use crate::services::reply::{parse_reply, spoken_phrases};
use crate::session::TurnView;

/// Outcome of one submission: both new turns plus any audio problems
#[derive(Debug, Clone, Serialize)]
pub struct SubmitResult {
    pub user: TurnView,
    pub assistant: TurnView,
    pub warnings: Vec<String>,
}

/// Send the learner's message (or the pending quick example) to the tutor.
///
/// A failed completion is recorded as an `Error: ...` reply and failed speech only adds
/// a warning, so both turns are always appended.
pub async fn submit_message(state: &AppState, id: Uuid, text: Option<&str>) -> AppResult<SubmitResult> {
    let handle = state.sessions.get(id).await?;
    let mut session = handle.lock().await;
    session.touch();

    let message = session
        .take_input(text)
        .ok_or_else(|| AppError::InvalidInput("type a message or pick an example first".to_string()))?;

    let settings = session.settings;
    let language = settings.language.name();
    let level = settings.level.name();
    let system_prompt = match state.config.reply_format {
        ReplyFormat::Lines => build_system_prompt(language, level, &settings.display),
        ReplyFormat::Json => build_structured_prompt(language, level, &settings.display),
    };

    info!("Session {} sends {} chars to the {} tutor", id, message.len(), language);

    let mut warnings = Vec::new();
    let (user_audio, reply) = {
        let request = CompletionRequest {
            system_prompt: &system_prompt,
            history: session.turns(),
            user_message: &message,
        };
        futures::join!(
            speak_user_turn(state, &message),
            reply_or_error(state.completion.as_ref(), &request)
        )
    };
    let user_clip = collect_audio(user_audio, &mut warnings);

    let phrases = spoken_phrases(&parse_reply(&reply)).join(" ");
    let assistant_clip = if phrases.is_empty() {
        None
    } else {
        collect_audio(
            Some(state.speech.render(&phrases, settings.language.locale()).await),
            &mut warnings,
        )
    };

    let user_index = session.push_turn(Turn::user(message), user_clip);
    let assistant_index = session.push_turn(Turn::assistant(reply), assistant_clip);

    let turns = session.turns();
    Ok(SubmitResult {
        user: TurnView::new(&turns[user_index], session.clip(user_index)),
        assistant: TurnView::new(&turns[assistant_index], session.clip(assistant_index)),
        warnings,
    })
}

/// The learner's own text is read back in English when enabled
async fn speak_user_turn(state: &AppState, message: &str) -> Option<AppResult<AudioClip>> {
    if !state.config.speak_user_turns {
        return None;
    }
    Some(state.speech.render(message, FALLBACK_LOCALE).await)
}

fn collect_audio(rendered: Option<AppResult<AudioClip>>, warnings: &mut Vec<String>) -> Option<AudioClip> {
    match rendered? {
        Ok(clip) => Some(clip),
        Err(e) => {
            warn!("Audio skipped: {}", e);
            warnings.push(format!("Audio unavailable: {}", e));
            None
        }
    }
}
