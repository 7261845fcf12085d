//! Upstream completion client.
//!
//! `CompletionClient` is the seam the generators talk to; `OpenAI` is the
//! production implementation over any OpenAI-compatible `chat/completions`
//! endpoint. Every call requests JSON-mode output and returns the raw content
//! string for the caller to parse.
//!
//! NOTE: We never log the API key or prompt contents; only sizes, model, latency and usage.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::config::Settings;
use crate::error::{ConfigError, UpstreamError};
use crate::util::trunc_for_log;

/// One chat message sent upstream.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ChatMessage {
  pub role: String,
  pub content: String,
}

impl ChatMessage {
  pub fn system(content: impl Into<String>) -> Self {
    Self { role: "system".into(), content: content.into() }
  }

  pub fn user(content: impl Into<String>) -> Self {
    Self { role: "user".into(), content: content.into() }
  }
}

/// A chat-completion backend that answers in JSON mode.
#[async_trait]
pub trait CompletionClient: Send + Sync {
  /// Send `messages` in one call and return the first choice's content (JSON text, unparsed).
  async fn complete_json(&self, messages: &[ChatMessage]) -> Result<String, UpstreamError>;
}

#[derive(Clone)]
pub struct OpenAI {
  client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
  pub temperature: Option<f32>,
}

impl OpenAI {
  /// Build the client from settings. Timeout is only set when configured.
  pub fn new(settings: &Settings) -> Result<Self, ConfigError> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = settings.timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build()?;

    Ok(Self {
      client,
      api_key: settings.api_key.clone(),
      base_url: settings.api_base.clone(),
      model: settings.model.clone(),
      temperature: settings.temperature,
    })
  }
}

#[async_trait]
impl CompletionClient for OpenAI {
  #[instrument(
    level = "info",
    skip(self, messages),
    fields(model = %self.model, messages = messages.len(), prompt_chars = messages.iter().map(|m| m.content.len()).sum::<usize>())
  )]
  async fn complete_json(&self, messages: &[ChatMessage]) -> Result<String, UpstreamError> {
    let url = format!("{}/chat/completions", self.base_url);
    let req = ChatCompletionRequest {
      model: &self.model,
      messages,
      temperature: self.temperature,
      response_format: ResponseFormat { r#type: "json_object" },
    };

    let start = Instant::now();
    let res = self.client.post(&url)
      .header(USER_AGENT, concat!("parsons-backend/", env!("CARGO_PKG_VERSION")))
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
      .json(&req).send().await?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let message = extract_openai_error(&body).unwrap_or(body);
      error!(elapsed = ?start.elapsed(), status = status.as_u16(), message = %trunc_for_log(&message, 300), "OpenAI call failed");
      return Err(UpstreamError::Http { status: status.as_u16(), message });
    }

    let body: ChatCompletionResponse = res.json().await?;
    if let Some(usage) = &body.usage {
      info!(prompt_tokens = ?usage.prompt_tokens, completion_tokens = ?usage.completion_tokens, total_tokens = ?usage.total_tokens, "OpenAI usage");
    }
    let text = body.choices.into_iter().next()
      .and_then(|c| c.message.content)
      .filter(|c| !c.trim().is_empty())
      .ok_or(UpstreamError::EmptyResponse)?;

    info!(elapsed = ?start.elapsed(), response_len = text.len(), "Model response received");
    Ok(text)
  }
}

// --- Chat DTOs ---

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
  model: &'a str,
  messages: &'a [ChatMessage],
  #[serde(skip_serializing_if = "Option::is_none")]
  temperature: Option<f32>,
  response_format: ResponseFormat,
}
#[derive(Serialize)]
struct ResponseFormat { #[serde(rename = "type")] r#type: &'static str }

#[derive(Deserialize)]
struct ChatCompletionResponse {
  #[serde(default)] choices: Vec<ChatChoice>,
  #[serde(default)] usage: Option<Usage>,
}
#[derive(Deserialize)]
struct ChatChoice { message: ChatMessageResp }
#[derive(Deserialize)]
struct ChatMessageResp { content: Option<String> }
#[derive(Deserialize)]
struct Usage {
  #[serde(default)] prompt_tokens: Option<u32>,
  #[serde(default)] completion_tokens: Option<u32>,
  #[serde(default)] total_tokens: Option<u32>,
}

/// Try to extract a clean error message from an OpenAI error body.
fn extract_openai_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap { error: EObj }
  #[derive(Deserialize)]
  struct EObj { message: String }
  serde_json::from_str::<EWrap>(body).ok().map(|w| w.error.message)
}
