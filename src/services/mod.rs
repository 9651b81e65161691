// Services module
// External collaborators (chat completion, speech) and the text handling around them

pub mod completion;
pub mod prompt;
pub mod reply;
pub mod transcript;
pub mod tts;

#[cfg(test)]
mod tests;
