// Domain models module
// Contains core data structures used throughout the application

pub mod chat;
pub mod examples;
pub mod language;

pub use chat::{AudioClip, DisplayOptions, Role, Turn};
pub use examples::{EXAMPLE_CATEGORIES, ExampleCategory};
pub use language::{Language, Level};

use serde::{Deserialize, Serialize};

/// Learning settings selected in the sidebar
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LearningSettings {
    pub language: Language,
    pub level: Level,
    #[serde(default)]
    pub display: DisplayOptions,
}
