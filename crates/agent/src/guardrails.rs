use glossgate_core::ProcessOutcome;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardrailDecision {
    Allow {
        text: String,
    },
    Deny {
        reason_code: &'static str,
        user_message: String,
        fallback_path: &'static str,
        errors: Vec<String>,
    },
    Degrade {
        reason_code: &'static str,
        user_message: String,
        fallback_path: &'static str,
    },
}

impl GuardrailDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GuardrailPolicy {
    pub rejection_header: String,
    pub forward_blank_messages: bool,
}

impl Default for GuardrailPolicy {
    fn default() -> Self {
        Self {
            rejection_header: "I can't send this to the assistant yet. Please fix the following:"
                .to_string(),
            forward_blank_messages: false,
        }
    }
}

impl GuardrailPolicy {
    /// Only clean outcomes are forwarded. Findings are rendered as a bulleted
    /// list under the rejection header.
    pub fn evaluate(&self, outcome: &ProcessOutcome) -> GuardrailDecision {
        match outcome {
            ProcessOutcome::Error { errors } => GuardrailDecision::Deny {
                reason_code: "glossary_validation_failed",
                user_message: format!("{}\n{}", self.rejection_header, outcome.render_errors()),
                fallback_path: "correct_and_resend",
                errors: errors.clone(),
            },
            ProcessOutcome::Ok { text } if text.trim().is_empty() && !self.forward_blank_messages => {
                GuardrailDecision::Degrade {
                    reason_code: "blank_message",
                    user_message: "There is nothing to send. Please type a message.".to_string(),
                    fallback_path: "request_message_text",
                }
            }
            ProcessOutcome::Ok { text } => GuardrailDecision::Allow { text: text.clone() },
        }
    }
}
