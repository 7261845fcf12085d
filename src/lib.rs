//! Parsons Backend
//!
//! Generates topic ideas and Parsons problems (code-reordering exercises) by
//! proxying prompts to an OpenAI-compatible chat-completion endpoint in JSON mode.

pub mod config;
pub mod domain;
pub mod error;
pub mod generate;
pub mod openai;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod util;

pub use config::Settings;
pub use routes::build_router;
pub use state::AppState;
