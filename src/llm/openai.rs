use super::LlmClient;
use super::prompt_builder;
use super::stream::read_stream_to_stdout;
use crate::config::OpenAiSettings;
use crate::error::{AppError, AppResult};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::io::BufReader;
use std::time::Duration;

const SERVICE: &str = "OpenAI";

const TEMPERATURE: f64 = 0.7;
const MAX_TOKENS: u32 = 1500;

/// Minimal request/response structs for OpenAI Chat Completions API.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
    max_tokens: u32,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Deserialize)]
struct StreamResponse {
    choices: Vec<StreamChoice>,
}

#[derive(Deserialize)]
struct StreamChoice {
    delta: StreamDelta,
}

#[derive(Deserialize)]
struct StreamDelta {
    content: Option<String>,
}

/// OpenAI-based implementation of LlmClient.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    api_base_url: String,
    stream: bool,
}

impl OpenAiClient {
    pub fn new(settings: &OpenAiSettings) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(transport)?;

        Ok(OpenAiClient {
            client,
            api_key: settings.api_key.clone(),
            model: settings.model.clone(),
            api_base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            stream: settings.stream,
        })
    }

    fn chat_url(&self) -> String {
        if self.api_base_url.ends_with("/v1") {
            format!("{}/chat/completions", self.api_base_url)
        } else {
            format!("{}/v1/chat/completions", self.api_base_url)
        }
    }

    fn build_request(&self, change_log: &str) -> ChatRequest {
        let prompts = prompt_builder::pr_description_prompt(change_log);

        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompts.system,
                },
                ChatMessage {
                    role: "user",
                    content: prompts.user,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
            stream: self.stream,
        }
    }

    fn call_chat(&self, req: &ChatRequest) -> AppResult<String> {
        let url = self.chat_url();

        if req.stream {
            log::info!("Streaming OpenAI model {:?}", &req.model);
        } else {
            log::info!("Calling OpenAI model {:?}", &req.model);
        }

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(req)
            .send()
            .map_err(transport)?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(AppError::Generation {
                status: status.as_u16(),
                body,
            });
        }

        if req.stream {
            let reader = BufReader::new(resp);
            return read_stream_to_stdout(SERVICE, reader, parse_stream_line);
        }

        let body = resp.text().map_err(transport)?;
        parse_chat_response(&body)
    }
}

fn transport(source: reqwest::Error) -> AppError {
    AppError::Transport {
        service: SERVICE,
        source,
    }
}

fn malformed(reason: impl Into<String>) -> AppError {
    AppError::MalformedResponse {
        service: SERVICE,
        reason: reason.into(),
    }
}

/// Extract the first choice's content from a non-streaming response body.
fn parse_chat_response(body: &str) -> AppResult<String> {
    let chat_resp: ChatResponse =
        serde_json::from_str(body).map_err(|e| malformed(e.to_string()))?;

    if let Some(usage) = &chat_resp.usage {
        log::info!(
            "Token usage: prompt={}, completion={}, total={}",
            usage.prompt_tokens,
            usage.completion_tokens,
            usage.total_tokens
        );
    }

    chat_resp
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| malformed("no choices returned"))?
        .message
        .content
        .ok_or_else(|| malformed("first choice has no message content"))
}

fn parse_stream_line(line: &str) -> AppResult<Option<String>> {
    let line = line.trim_start();
    if !line.starts_with("data:") {
        return Ok(None);
    }

    let data = line.trim_start_matches("data:").trim();
    if data == "[DONE]" {
        return Ok(None);
    }

    let chunk: StreamResponse = serde_json::from_str(data)
        .map_err(|e| malformed(format!("bad streaming chunk: {e}")))?;
    let content = chunk
        .choices
        .first()
        .and_then(|c| c.delta.content.clone());

    Ok(content)
}

impl LlmClient for OpenAiClient {
    fn generate_pr_description(&self, change_log: &str) -> AppResult<String> {
        let req = self.build_request(change_log);

        if let Some(user) = req.messages.last() {
            log::trace!("PR description prompt:\n{}", truncate(&user.content, 3500));
        }

        self.call_chat(&req)
    }
}

/// Truncate long strings for debug logging.
fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}...\n[truncated {} bytes]", &s[..cut], s.len() - cut),
    }
}
