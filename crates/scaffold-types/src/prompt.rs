//! Prompt request type consumed by the prompter collaborator.

use serde::{Deserialize, Serialize};

/// A single question to ask the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptRequest {
    /// Text shown to the user.
    pub prompt: String,
    /// Value used when the user submits an empty answer.
    #[serde(default)]
    pub default: Option<String>,
    /// Hide typed characters.
    #[serde(default)]
    pub silent: bool,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            default: None,
            silent: false,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }
}
