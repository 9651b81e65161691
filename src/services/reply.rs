//! Splits an assistant reply into the components shown in the chat.

use serde::{Deserialize, Serialize};

use super::prompt::ESCAPED_NEWLINE;

pub const RESPONSE_PREFIX: &str = "Response:";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    Response,
    Pronunciation,
    Translation,
    Corrections,
    Other,
}

impl ComponentKind {
    fn classify(line: &str) -> Self {
        if line.starts_with(RESPONSE_PREFIX) {
            Self::Response
        } else if line.starts_with("(Pronunciation:") || line.starts_with("Pronunciation:") {
            Self::Pronunciation
        } else if line.starts_with("Translation:") {
            Self::Translation
        } else if line.starts_with("Corrections:") {
            Self::Corrections
        } else {
            Self::Other
        }
    }
}

/// One displayed line of a reply
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplyLine {
    pub kind: ComponentKind,
    pub text: String,
}

impl ReplyLine {
    /// The phrase to speak, for `Response:` lines only
    pub fn spoken_text(&self) -> Option<&str> {
        match self.kind {
            ComponentKind::Response => Some(strip_response_prefix(&self.text)),
            _ => None,
        }
    }
}

/// Replaces the literal `\n` token with a real line break.
pub fn unescape_newlines(raw: &str) -> String {
    raw.replace(ESCAPED_NEWLINE, "\n")
}

/// Splits the reply into non-empty lines and labels each one.
pub fn parse_reply(text: &str) -> Vec<ReplyLine> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let line = line.trim_end();
            ReplyLine {
                kind: ComponentKind::classify(line),
                text: line.to_string(),
            }
        })
        .collect()
}

/// Phrases to hand to speech synthesis, in reply order.
pub fn spoken_phrases(lines: &[ReplyLine]) -> Vec<&str> {
    lines
        .iter()
        .filter_map(ReplyLine::spoken_text)
        .filter(|text| !text.is_empty())
        .collect()
}

fn strip_response_prefix(line: &str) -> &str {
    line.strip_prefix(RESPONSE_PREFIX).unwrap_or(line).trim()
}
