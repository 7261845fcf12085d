//! Application state: the upstream client, prompts, and settings.
//!
//! Built once at startup and shared read-only (`Arc<AppState>`) by every handler.
//! There is no per-request or cross-request mutable state.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::{load_prompts_from_env, Prompts, Settings};
use crate::error::ConfigError;
use crate::openai::{CompletionClient, OpenAI};

#[derive(Clone)]
pub struct AppState {
    pub client: Arc<dyn CompletionClient>,
    pub prompts: Prompts,
    pub settings: Settings,
}

impl AppState {
    /// Assemble state from explicit parts (used by tests with a mock client).
    pub fn new(client: Arc<dyn CompletionClient>, prompts: Prompts, settings: Settings) -> Self {
        Self { client, prompts, settings }
    }

    /// Build state from settings: OpenAI client + prompts (TOML override or defaults).
    #[instrument(level = "info", skip_all)]
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let openai = OpenAI::new(&settings)?;
        info!(
            target: "parsons_backend",
            base_url = %openai.base_url,
            model = %openai.model,
            temperature = ?openai.temperature,
            timeout = ?settings.timeout,
            validate_problem_sets = settings.validate_problem_sets,
            "OpenAI client configured."
        );
        let prompts = load_prompts_from_env();
        Ok(Self::new(Arc::new(openai), prompts, settings))
    }
}
