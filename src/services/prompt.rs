//! Builds the tutor's system instruction.
//!
//! The reply layout is a line convention: every directive ends with the literal
//! two-character token `\n`, which the completion client turns back into a real
//! line break once the model answers.

use crate::models::DisplayOptions;

/// Literal token the model is asked to emit between components
pub const ESCAPED_NEWLINE: &str = "\\n";

pub const PRONUNCIATION_DIRECTIVE: &str = "(Pronunciation: [Simple phonetic pronunciation guide])";
pub const TRANSLATION_DIRECTIVE: &str = "Translation: [English translation]";
pub const CORRECTIONS_DIRECTIVE: &str = "Corrections: [Any corrections or suggestions]";

/// Returns the directive lines for the enabled components, `Response:` first.
pub fn directives(language: &str, options: &DisplayOptions) -> Vec<String> {
    let mut lines = vec![format!("Response: [Phrase in {}]", language)];
    if options.pronunciation {
        lines.push(PRONUNCIATION_DIRECTIVE.to_string());
    }
    if options.translation {
        lines.push(TRANSLATION_DIRECTIVE.to_string());
    }
    if options.corrections {
        lines.push(CORRECTIONS_DIRECTIVE.to_string());
    }
    lines
}

/// System prompt for the line-based reply format.
pub fn build_system_prompt(language: &str, level: &str, options: &DisplayOptions) -> String {
    let directive_block = directives(language, options)
        .into_iter()
        .map(|line| format!("{}{}", line, ESCAPED_NEWLINE))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a helpful language learning partner for {language}.\n\
         Adjust to {level} level. Keep responses natural and simple.\n\
         Format your response with exactly these line breaks using '{ESCAPED_NEWLINE}':\n\
         \n\
         {directive_block}\n"
    )
}

/// System prompt for the JSON reply format. Disabled components must come back as null.
pub fn build_structured_prompt(language: &str, level: &str, options: &DisplayOptions) -> String {
    let field = |enabled: bool, name: &str, description: &str| {
        if enabled {
            format!("- \"{}\": {}\n", name, description)
        } else {
            format!("- \"{}\": always null\n", name)
        }
    };

    format!(
        "You are a helpful language learning partner for {language}.\n\
         Adjust to {level} level. Keep responses natural and simple.\n\
         Answer with a JSON object containing:\n\
         - \"response\": your phrase in {language}\n\
         {}{}{}",
        field(
            options.pronunciation,
            "pronunciation",
            "a simple phonetic pronunciation guide for the phrase"
        ),
        field(options.translation, "translation", "the English translation"),
        field(
            options.corrections,
            "corrections",
            "any corrections or suggestions for the learner's message"
        ),
    )
}
