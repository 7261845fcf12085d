//! HTTP endpoint handlers. Thin wrappers that forward to the generators and map
//! every failure to a single 500 shape: `{"detail": "Error generating <what>: <message>"}`.

use std::sync::Arc;

use axum::{
  extract::{Query, State},
  http::{header, StatusCode},
  response::{IntoResponse, Response},
  Json,
};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tracing::{error, info, instrument};

use crate::error::GenerationError;
use crate::generate::{generate_problems, generate_topics};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TopicsQuery {
  pub activity_name: String,
}

#[derive(Debug, Deserialize)]
pub struct ProblemsQuery {
  pub specification: String,
}

#[derive(Serialize)]
pub struct TopicsOut {
  pub topics: Box<RawValue>,
}

#[derive(Serialize)]
pub struct HealthOut {
  pub ok: bool,
}

#[derive(Serialize)]
struct ErrorOut {
  detail: String,
}

/// A failed generation, labelled with the operation it came from.
#[derive(Debug)]
pub struct ApiError {
  what: &'static str,
  source: GenerationError,
}

impl ApiError {
  fn topics(source: GenerationError) -> Self {
    Self { what: "topics", source }
  }

  fn problems(source: GenerationError) -> Self {
    Self { what: "problems", source }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    error!(target: "generation", what = self.what, error = %self.source, "Generation failed");
    let detail = format!("Error generating {}: {}", self.what, self.source);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorOut { detail })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, q), fields(activity_len = q.activity_name.len()))]
pub async fn http_get_topics(
  State(state): State<Arc<AppState>>,
  Query(q): Query<TopicsQuery>,
) -> Result<Json<TopicsOut>, ApiError> {
  let topics = generate_topics(state.client.as_ref(), &state.prompts, &q.activity_name)
    .await
    .map_err(ApiError::topics)?;
  info!(target: "generation", topics_len = topics.get().len(), "Topics generated");
  Ok(Json(TopicsOut { topics }))
}

/// Relays the model's JSON verbatim, so the body is written as-is rather than re-serialized.
#[instrument(level = "info", skip(state, q), fields(spec_len = q.specification.len()))]
pub async fn http_get_problems(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProblemsQuery>,
) -> Result<Response, ApiError> {
  let problems = generate_problems(
    state.client.as_ref(),
    &state.prompts,
    &q.specification,
    state.settings.validate_problem_sets,
  )
  .await
  .map_err(ApiError::problems)?;
  info!(target: "generation", body_len = problems.get().len(), "Problems generated");

  Ok(([(header::CONTENT_TYPE, "application/json")], problems.get().to_owned()).into_response())
}
