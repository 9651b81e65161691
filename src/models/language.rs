use std::fmt;

use serde::{Deserialize, Serialize};

/// Locale for speaking the learner's own turns.
pub const FALLBACK_LOCALE: &str = "en";

/// Языки, доступные для практики
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Spanish,
    French,
    German,
    Italian,
    Japanese,
    Korean,
    Chinese,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Japanese,
        Language::Korean,
        Language::Chinese,
    ];

    /// Plain name used inside the tutor prompt
    pub fn name(&self) -> &'static str {
        match self {
            Self::Spanish => "Spanish",
            Self::French => "French",
            Self::German => "German",
            Self::Italian => "Italian",
            Self::Japanese => "Japanese",
            Self::Korean => "Korean",
            Self::Chinese => "Chinese",
        }
    }

    /// Label shown in the language selector
    pub fn label(&self) -> &'static str {
        match self {
            Self::Spanish => "Spanish 🇪🇸",
            Self::French => "French 🇫🇷",
            Self::German => "German 🇩🇪",
            Self::Italian => "Italian 🇮🇹",
            Self::Japanese => "Japanese 🇯🇵",
            Self::Korean => "Korean 🇰🇷",
            Self::Chinese => "Chinese 🇨🇳",
        }
    }

    /// Код локали для синтеза речи
    pub fn locale(&self) -> &'static str {
        match self {
            Self::Spanish => "es",
            Self::French => "fr",
            Self::German => "de",
            Self::Italian => "it",
            Self::Japanese => "ja",
            Self::Korean => "ko",
            Self::Chinese => "zh-CN",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Уровень владения языком
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Beginner => "Beginner 🌱",
            Self::Intermediate => "Intermediate 🌿",
            Self::Advanced => "Advanced 🌳",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
