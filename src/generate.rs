//! The two generators: prompt assembly, one upstream call, JSON parse.
//!
//! Results are returned as `RawValue` so the model's output is relayed as
//! received (key order and inner formatting included), after a syntax check.
//! Whitespace surrounding the document is trimmed.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::value::RawValue;
use tracing::{debug, instrument};

use crate::config::Prompts;
use crate::domain::{ProblemSet, ProblemSpec};
use crate::error::GenerationError;
use crate::openai::{ChatMessage, CompletionClient};
use crate::util::fill_template;

pub fn topics_prompt(prompts: &Prompts, activity_name: &str) -> String {
  fill_template(&prompts.topics_system, &[("activity_name", activity_name)])
}

/// `{topics}` goes last so topic text is never scanned for placeholders.
pub fn problems_prompt(prompts: &Prompts, spec: &ProblemSpec) -> String {
  let num = spec.num_problems.to_string();
  let topics = spec.topics.join(", ");
  fill_template(&prompts.problems_system, &[("num_problems", &num), ("topics", &topics)])
}

/// base64 → UTF-8 → JSON. Returns the decoded text too, since it is forwarded as the user turn.
///
/// Query-string decoding turns an unescaped `+` into a space; base64 never
/// contains spaces, so they are mapped back before decoding.
pub fn decode_specification(encoded: &str) -> Result<(String, ProblemSpec), GenerationError> {
  let bytes = STANDARD.decode(encoded.trim().replace(' ', "+"))?;
  let text = String::from_utf8(bytes)?;
  let spec = serde_json::from_str::<ProblemSpec>(&text).map_err(GenerationError::SpecJson)?;
  Ok((text, spec))
}

fn parse_model_json(text: &str) -> Result<Box<RawValue>, GenerationError> {
  serde_json::from_str::<Box<RawValue>>(text).map_err(GenerationError::ResponseJson)
}

#[instrument(level = "info", skip(client, prompts), fields(activity_len = activity_name.len()))]
pub async fn generate_topics(
  client: &dyn CompletionClient,
  prompts: &Prompts,
  activity_name: &str,
) -> Result<Box<RawValue>, GenerationError> {
  let system = topics_prompt(prompts, activity_name);
  let text = client.complete_json(&[ChatMessage::system(system)]).await?;
  parse_model_json(&text)
}

#[instrument(level = "info", skip(client, prompts, specification), fields(spec_len = specification.len()))]
pub async fn generate_problems(
  client: &dyn CompletionClient,
  prompts: &Prompts,
  specification: &str,
  validate: bool,
) -> Result<Box<RawValue>, GenerationError> {
  let (decoded, spec) = decode_specification(specification)?;
  debug!(topics = spec.topics.len(), num_problems = spec.num_problems, "Decoded problem specification");

  let system = problems_prompt(prompts, &spec);
  let messages = [ChatMessage::system(system), ChatMessage::user(decoded)];
  let text = client.complete_json(&messages).await?;
  let raw = parse_model_json(&text)?;

  if validate {
    let set = serde_json::from_str::<ProblemSet>(raw.get())
      .map_err(|e| GenerationError::InvalidProblemSet(e.to_string()))?;
    set.check(spec.num_problems).map_err(GenerationError::InvalidProblemSet)?;
  }
  Ok(raw)
}
