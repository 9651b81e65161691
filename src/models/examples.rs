use serde::Serialize;

/// A group of quick-example phrases shown next to the chat
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExampleCategory {
    pub title: &'static str,
    pub phrases: &'static [&'static str],
}

pub const EXAMPLE_CATEGORIES: &[ExampleCategory] = &[
    ExampleCategory {
        title: "👋 Greetings",
        phrases: &[
            "Hello and Welcome, how are you today?",
            "My name is Ms. GenAI Tutor. What is your name?",
        ],
    },
    ExampleCategory {
        title: "🔢 Numbers",
        phrases: &[
            "Count numbers 1 to 10",
            "What is the cost of these items, please?",
        ],
    },
    ExampleCategory {
        title: "🍽️ Dining",
        phrases: &[
            "I would like a cup a coffee, with milk and sugar please",
            "May I please see menu",
        ],
    },
    ExampleCategory {
        title: "🗺️ Directions",
        phrases: &[
            "Excuse me, Would you please tell me how to get to Train station?",
            "Where is the nearest pharmacy?",
        ],
    },
];

pub fn is_known_example(phrase: &str) -> bool {
    EXAMPLE_CATEGORIES
        .iter()
        .flat_map(|category| category.phrases.iter())
        .any(|known| *known == phrase)
}
