use serde::{Deserialize, Serialize};

use crate::validation::Validator;

/// Result handed to chat surfaces and the agent layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessOutcome {
    Ok { text: String },
    Error { errors: Vec<String> },
}

impl ProcessOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Ok { .. } => "ok",
            Self::Error { .. } => "error",
        }
    }

    /// Errors as a bulleted list, one `- ` line per message. Empty for `Ok`.
    pub fn render_errors(&self) -> String {
        match self {
            Self::Ok { .. } => String::new(),
            Self::Error { errors } => {
                errors.iter().map(|error| format!("- {error}")).collect::<Vec<_>>().join("\n")
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct MessageProcessor {
    validator: Validator,
}

impl MessageProcessor {
    pub fn new(validator: Validator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn process(&self, text: &str) -> ProcessOutcome {
        let errors = self.validator.validate(text);
        if errors.is_empty() {
            ProcessOutcome::Ok { text: text.to_string() }
        } else {
            ProcessOutcome::Error { errors }
        }
    }
}
