//! Domain models: the caller's problem specification and the Parsons problem set
//! the model is asked to produce.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Decoded payload of the `specification` query parameter.
/// Unknown fields are ignored; both known fields are optional.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProblemSpec {
  #[serde(default)]
  pub topics: Vec<String>,
  #[serde(default = "default_num_problems")]
  pub num_problems: u32,
}

fn default_num_problems() -> u32 { 1 }

impl Default for ProblemSpec {
  fn default() -> Self {
    Self { topics: Vec::new(), num_problems: default_num_problems() }
  }
}

/// A set of Parsons problems as requested in the problems prompt.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemSet {
  pub activity_name: String,
  pub problems: Vec<Problem>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
  pub prompt: String,
  pub blocks: Vec<Block>,
  /// Block ids of the solution, in order. Blocks not listed are distractors.
  pub correct_order: Vec<String>,
}

/// One line of code, no comments, no indentation.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Block {
  pub id: String,
  pub code: String,
}

impl ProblemSet {
  /// Structural checks the prompt asks for but the model may not honor.
  /// Returns a human-readable reason for the first violation found.
  pub fn check(&self, expected_problems: u32) -> Result<(), String> {
    if self.problems.len() != expected_problems as usize {
      return Err(format!(
        "expected {} problems, got {}",
        expected_problems,
        self.problems.len()
      ));
    }
    for (idx, p) in self.problems.iter().enumerate() {
      let mut ids = HashSet::new();
      for b in &p.blocks {
        if !ids.insert(b.id.as_str()) {
          return Err(format!("problem {}: duplicate block id '{}'", idx, b.id));
        }
      }
      if p.correct_order.is_empty() {
        return Err(format!("problem {}: correctOrder is empty", idx));
      }
      if let Some(missing) = p.correct_order.iter().find(|id| !ids.contains(id.as_str())) {
        return Err(format!("problem {}: correctOrder references unknown block '{}'", idx, missing));
      }
    }
    Ok(())
  }
}
