pub mod openai;
mod prompts;
mod prompt_builder;
mod stream;

use crate::error::AppResult;

/// Trait for talking to a chat-completion model.
pub trait LlmClient: Send + Sync {
    /// Generate a pull request description from a serialized change log.
    /// The returned text is the model's output, untouched.
    fn generate_pr_description(&self, change_log: &str) -> AppResult<String>;
}
