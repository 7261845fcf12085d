//! Parsons Backend · topic + Parsons problem generator
//!
//! - Axum HTTP API (`/generate-topics`, `/generate-problems`, `/health`)
//! - Landing page + static assets
//! - OpenAI-compatible upstream in JSON mode
//!
//! Important env variables (a `.env` file is loaded first if present):
//!   OPENAI_API_KEY         : required; boot fails without it
//!   OPENAI_API_BASE        : default "https://api.openai.com/v1"
//!   OPENAI_API_MODEL_NAME  : default "gpt-4o"
//!   OPENAI_TEMPERATURE     : optional
//!   OPENAI_TIMEOUT_SECS    : optional; no client timeout when unset
//!   PORT                   : u16 (default 8000)
//!   STATIC_DIR / INDEX_PATH: front-end locations
//!   PROMPTS_CONFIG_PATH    : TOML with [prompts] overrides
//!   VALIDATE_PROBLEM_SETS  : "true" to check generated problem sets before relaying
//!   LOG_LEVEL / LOG_FORMAT : tracing filter, "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tracing::info;

use parsons_backend::{build_router, telemetry, AppState, Settings};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  dotenvy::dotenv().ok();
  telemetry::init_tracing();

  let settings = Settings::from_env()?;
  let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));

  // Upstream client + prompts, constructed once and injected into handlers.
  let state = Arc::new(AppState::from_settings(settings)?);
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "parsons_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(target: "parsons_backend", error = %e, "Failed to listen for ctrl-c; running until killed");
    std::future::pending::<()>().await;
  }
  info!(target: "parsons_backend", "Shutdown signal received");
}
