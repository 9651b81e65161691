//! Plain-text export of a chat session.

use chrono::{DateTime, Local};

use crate::errors::{AppError, AppResult};
use crate::models::Turn;

/// Separator replacing line breaks inside one turn
pub const LINE_JOINER: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    pub file_name: String,
    pub content: String,
}

/// One line per turn: `User: ...` / `Assistant: ...`
pub fn format_transcript(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| {
            let content = turn
                .content()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .collect::<Vec<_>>()
                .join(LINE_JOINER);
            format!("{}: {}", turn.role().transcript_label(), content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn transcript_file_name(at: DateTime<Local>) -> String {
    format!("chat_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

pub fn export_transcript(turns: &[Turn], at: DateTime<Local>) -> AppResult<Transcript> {
    if turns.is_empty() {
        return Err(AppError::InvalidInput("there is no chat to save yet".to_string()));
    }
    Ok(Transcript {
        file_name: transcript_file_name(at),
        content: format_transcript(turns),
    })
}
