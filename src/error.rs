//! Error types. Everything a request can hit collapses into `GenerationError`,
//! which the HTTP layer always reports as a 500.

use thiserror::Error;

/// Failures while loading settings at boot.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Please add your OpenAI API key to the environment (OPENAI_API_KEY).")]
  MissingApiKey,
  #[error("Invalid value for {var}: {reason}")]
  Invalid { var: &'static str, reason: String },
  #[error("Failed to build HTTP client: {0}")]
  HttpClient(#[from] reqwest::Error),
}

/// Failures talking to the completion endpoint.
#[derive(Debug, Error)]
pub enum UpstreamError {
  #[error("request failed: {0}")]
  Transport(#[from] reqwest::Error),
  #[error("OpenAI HTTP {status}: {message}")]
  Http { status: u16, message: String },
  #[error("completion response had no content")]
  EmptyResponse,
}

/// Anything that can go wrong while generating topics or problems.
#[derive(Debug, Error)]
pub enum GenerationError {
  #[error("invalid base64 specification: {0}")]
  Base64(#[from] base64::DecodeError),
  #[error("specification is not valid UTF-8: {0}")]
  Utf8(#[from] std::string::FromUtf8Error),
  #[error("invalid specification JSON: {0}")]
  SpecJson(#[source] serde_json::Error),
  #[error("{0}")]
  Upstream(#[from] UpstreamError),
  #[error("model returned invalid JSON: {0}")]
  ResponseJson(#[source] serde_json::Error),
  #[error("model returned an invalid problem set: {0}")]
  InvalidProblemSet(String),
}
