use serde::Serialize;
use uuid::Uuid;

use super::Session;
use crate::models::{AudioClip, LearningSettings, Role, Turn};
use crate::services::reply::{ReplyLine, parse_reply};

/// A turn as rendered in the chat pane
#[derive(Debug, Clone, Serialize)]
pub struct TurnView {
    pub role: Role,
    pub content: String,
    /// Parsed components, assistant turns only
    pub lines: Vec<ReplyLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioClip>,
}

impl TurnView {
    pub fn new(turn: &Turn, clip: Option<&AudioClip>) -> Self {
        let lines = match turn.role() {
            Role::Assistant => parse_reply(turn.content()),
            Role::User => Vec::new(),
        };
        Self {
            role: turn.role(),
            content: turn.content().to_string(),
            lines,
            audio: clip.cloned(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub id: Uuid,
    pub settings: LearningSettings,
    pub pending_example: Option<String>,
    /// Save Chat is only offered once something was said
    pub can_save: bool,
    pub turns: Vec<TurnView>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        let turns = session
            .turns()
            .iter()
            .enumerate()
            .map(|(index, turn)| TurnView::new(turn, session.clip(index)))
            .collect::<Vec<_>>();

        Self {
            id: session.id(),
            settings: session.settings,
            pending_example: session.pending_example().map(str::to_string),
            can_save: !turns.is_empty(),
            turns,
        }
    }
}
