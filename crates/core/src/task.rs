//! The task a run is trained on.
//!
//! The context (system instruction + user query) is shown to every role.
//! The ground truth is only ever shown to the reflector.

use serde::{Deserialize, Serialize};

/// The user's system prompt and query, reused unchanged across iterations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskContext {
    pub system_prompt: String,
    pub user_prompt: String,
}

impl TaskContext {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
        }
    }

    /// JSON rendering embedded in role requests.
    pub fn to_json(&self) -> String {
        serde_json::json!({
            "system_prompt": self.system_prompt,
            "user_prompt": self.user_prompt,
        })
        .to_string()
    }
}

/// A task context paired with its reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(flatten)]
    pub context: TaskContext,
    pub ground_truth: String,
}

impl Task {
    pub fn new(context: TaskContext, ground_truth: impl Into<String>) -> Self {
        Self {
            context,
            ground_truth: ground_truth.into(),
        }
    }
}
