use crate::config::{GitHubSettings, OpenAiSettings};
use crate::error::AppResult;
use crate::github::{CompareSource, GitHubClient};
use crate::llm::LlmClient;
use crate::llm::openai::OpenAiClient;
use log::debug;

/// Build the compare client from resolved settings.
pub fn build_compare_source(settings: &GitHubSettings) -> AppResult<Box<dyn CompareSource>> {
    debug!("Using GitHub API at {}", settings.api_base_url);

    Ok(Box::new(GitHubClient::new(settings)?))
}

/// Build the LLM client from resolved settings.
pub fn build_llm_client(settings: &OpenAiSettings) -> AppResult<Box<dyn LlmClient>> {
    debug!(
        "Using OpenAiClient with model {} at {}",
        settings.model, settings.api_base_url
    );

    Ok(Box::new(OpenAiClient::new(settings)?))
}
