// Session module
// Owned per-browser conversation state and the store that keeps it alive

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{AudioClip, LearningSettings, Turn};

pub mod store;
pub mod view;

pub use store::SessionStore;
pub use view::{SessionView, TurnView};

/// Conversation state of one browser session.
///
/// Turns are append-only; the only way to remove them is [`Session::clear`].
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: Instant,
    pub settings: LearningSettings,
    turns: Vec<Turn>,
    clips: HashMap<usize, AudioClip>,
    pending_example: Option<String>,
}

impl Session {
    pub fn new(settings: LearningSettings) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_active: Instant::now(),
            settings,
            turns: Vec::new(),
            clips: HashMap::new(),
            pending_example: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Audio recorded for the turn at `index`, if synthesis succeeded
    pub fn clip(&self, index: usize) -> Option<&AudioClip> {
        self.clips.get(&index)
    }

    pub fn pending_example(&self) -> Option<&str> {
        self.pending_example.as_deref()
    }

    pub fn select_example(&mut self, phrase: impl Into<String>) {
        self.pending_example = Some(phrase.into());
    }

    /// Resolves the text of the next submission.
    ///
    /// Typed text wins over the pending example. Either way the pending example
    /// is consumed, so it is never offered twice.
    pub fn take_input(&mut self, typed: Option<&str>) -> Option<String> {
        let pending = self.pending_example.take();
        typed
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .or(pending)
    }

    /// Appends a turn and returns its index.
    pub fn push_turn(&mut self, turn: Turn, clip: Option<AudioClip>) -> usize {
        let index = self.turns.len();
        self.turns.push(turn);
        if let Some(clip) = clip {
            self.clips.insert(index, clip);
        }
        index
    }

    /// Clear Chat: drops every turn and its audio
    pub fn clear(&mut self) {
        self.turns.clear();
        self.clips.clear();
    }

    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }
}
