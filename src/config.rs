//! Runtime configuration: upstream settings from the environment, plus prompts
//! that may be overridden from a TOML file (PROMPTS_CONFIG_PATH).
//!
//! Prompt TOML schema:
//! ```toml
//! [prompts]
//! topics_system = "... {activity_name} ..."
//! problems_system = "... {topics} ... {num_problems} ..."
//! ```

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{error, info};

use crate::error::ConfigError;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_PORT: u16 = 8000;

/// Process settings. Built once at startup and shared read-only.
#[derive(Clone, Debug)]
pub struct Settings {
  pub api_key: String,
  pub api_base: String,
  pub model: String,
  pub temperature: Option<f32>,
  pub timeout: Option<Duration>,
  pub port: u16,
  pub static_dir: PathBuf,
  pub index_path: PathBuf,
  pub validate_problem_sets: bool,
}

impl Settings {
  pub fn from_env() -> Result<Self, ConfigError> {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build settings from any key lookup (the environment in production, a map in tests).
  pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
  where
    F: Fn(&str) -> Option<String>,
  {
    let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    let api_key = var("OPENAI_API_KEY").ok_or(ConfigError::MissingApiKey)?;
    let api_base = var("OPENAI_API_BASE")
      .unwrap_or_else(|| DEFAULT_API_BASE.into())
      .trim_end_matches('/')
      .to_string();
    let model = var("OPENAI_API_MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL.into());

    let temperature = match var("OPENAI_TEMPERATURE") {
      Some(t) => Some(t.parse::<f32>().map_err(|e| ConfigError::Invalid {
        var: "OPENAI_TEMPERATURE",
        reason: e.to_string(),
      })?),
      None => None,
    };
    let timeout = match var("OPENAI_TIMEOUT_SECS") {
      Some(t) => Some(Duration::from_secs(t.parse::<u64>().map_err(|e| ConfigError::Invalid {
        var: "OPENAI_TIMEOUT_SECS",
        reason: e.to_string(),
      })?)),
      None => None,
    };
    let port = match var("PORT") {
      Some(p) => p.parse::<u16>().map_err(|e| ConfigError::Invalid { var: "PORT", reason: e.to_string() })?,
      None => DEFAULT_PORT,
    };
    let validate_problem_sets = match var("VALIDATE_PROBLEM_SETS").as_deref() {
      None => false,
      Some("1") | Some("true") | Some("yes") => true,
      Some("0") | Some("false") | Some("no") => false,
      Some(other) => {
        return Err(ConfigError::Invalid {
          var: "VALIDATE_PROBLEM_SETS",
          reason: format!("expected true/false, got '{other}'"),
        })
      }
    };

    Ok(Self {
      api_key,
      api_base,
      model,
      temperature,
      timeout,
      port,
      static_dir: var("STATIC_DIR").unwrap_or_else(|| "./static".into()).into(),
      index_path: var("INDEX_PATH").unwrap_or_else(|| "./templates/index.html".into()).into(),
      validate_problem_sets,
    })
  }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PromptsConfig {
  #[serde(default)]
  pub prompts: Prompts,
}

/// System prompt templates. `{activity_name}`, `{topics}` and `{num_problems}`
/// are substituted at request time; all other braces are literal.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Prompts {
  pub topics_system: String,
  pub problems_system: String,
}

impl Default for Prompts {
  fn default() -> Self {
    Self {
      topics_system: TOPICS_SYSTEM.into(),
      problems_system: PROBLEMS_SYSTEM.into(),
    }
  }
}

const TOPICS_SYSTEM: &str = r#"You are a creative assistant. Generate a list of topic ideas for Parsons problems.
The topics should be relevant to the activity: "{activity_name}".
Provide 5-10 diverse and interesting topics that could be discussed in this activity.
The output must be a valid JSON array of strings, like this:
["Topic 1", "Topic 2", "Topic 3", "Topic 4", "Topic 5"]"#;

const PROBLEMS_SYSTEM: &str = r#"You are a Parsons problem generator.

Your task is to generate a set of problems based on the selected topics.
Each problem should include:
- A problem statement.
- A list of code blocks, including distractor blocks.
- The correct order of the blocks.

The following rules must be followed:
1. Each block must contain only code. No block should contain comments.
2. None of the blocks should have any indentation. All code should be left-aligned.

The output should be a JSON object with the following structure:

{
    "activityName": "Custom Parsons Problem",
    "problems": [
        {
            "prompt": "Divide the cost of a meal and tip among a given number of people.",
            "blocks": [
                { "id": "a", "code": "let tipAmount = mealCost * (tipPercentage /100);" },
                { "id": "b", "code": "let totalCost = mealCost + tipAmount;" },
                { "id": "c", "code": "let costPerPerson = totalCost / numPeople;" },
                { "id": "d", "code": "let costPerPerson = mealCost / numPeople;" },
                { "id": "e", "code": "let totalCost = mealCost - tipAmount;" },
                { "id": "f", "code": "let tipAmount = mealCost + (tipPercentage /100);" }
            ],
            "correctOrder": ["a", "b", "c"]
        },
        ...
    ]
}

The problems should be based on the following topics: {topics}.
The collection should have exactly {num_problems} problems."#;

/// Load prompts from PROMPTS_CONFIG_PATH (see `load_prompts`).
pub fn load_prompts_from_env() -> Prompts {
  load_prompts(std::env::var("PROMPTS_CONFIG_PATH").ok().as_deref())
}

/// Load prompts from a TOML file. On any IO/parse error, log it and fall back to defaults.
pub fn load_prompts(path: Option<&str>) -> Prompts {
  let Some(path) = path else {
    return Prompts::default();
  };
  match std::fs::read_to_string(path) {
    Ok(s) => match toml::from_str::<PromptsConfig>(&s) {
      Ok(cfg) => {
        info!(target: "parsons_backend", %path, "Loaded prompts config (TOML)");
        cfg.prompts
      }
      Err(e) => {
        error!(target: "parsons_backend", %path, error = %e, "Failed to parse TOML prompts; using defaults");
        Prompts::default()
      }
    },
    Err(e) => {
      error!(target: "parsons_backend", %path, error = %e, "Failed to read TOML prompts file; using defaults");
      Prompts::default()
    }
  }
}
