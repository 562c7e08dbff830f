use std::sync::Arc;

use glossgate_core::MessageProcessor;
use tracing::{error, info};

use crate::client::{AgentClient, AgentError, AgentReply, AgentRequest};
use crate::guardrails::{GuardrailDecision, GuardrailPolicy};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AgentTurn {
    Forwarded {
        session_id: String,
        reply: AgentReply,
    },
    Rejected {
        reason_code: &'static str,
        user_message: String,
        errors: Vec<String>,
    },
}

pub struct AgentRuntime {
    processor: Arc<MessageProcessor>,
    guardrails: GuardrailPolicy,
    client: Arc<dyn AgentClient>,
}

impl AgentRuntime {
    pub fn new(
        processor: Arc<MessageProcessor>,
        guardrails: GuardrailPolicy,
        client: Arc<dyn AgentClient>,
    ) -> Self {
        Self { processor, guardrails, client }
    }

    pub fn processor(&self) -> &MessageProcessor {
        &self.processor
    }

    pub fn client_name(&self) -> &'static str {
        self.client.name()
    }

    /// Validates `text` and forwards it to the agent only when the guardrail
    /// allows it. Agent failures never alter the validation outcome.
    pub async fn handle_message(
        &self,
        session_id: &str,
        text: &str,
    ) -> Result<AgentTurn, AgentError> {
        let outcome = self.processor.process(text);

        match self.guardrails.evaluate(&outcome) {
            GuardrailDecision::Allow { text } => {
                let request = AgentRequest { session_id: session_id.to_string(), input: text };
                let reply = self.client.send(&request).await.map_err(|agent_error| {
                    error!(
                        event_name = "agent.message.failed",
                        session_id,
                        client = self.client.name(),
                        error = %agent_error,
                        "agent invocation failed"
                    );
                    agent_error
                })?;
                info!(
                    event_name = "agent.message.forwarded",
                    session_id,
                    client = self.client.name(),
                    "message forwarded to agent"
                );
                Ok(AgentTurn::Forwarded { session_id: session_id.to_string(), reply })
            }
            GuardrailDecision::Deny { reason_code, user_message, errors, .. } => {
                info!(
                    event_name = "agent.message.rejected",
                    session_id,
                    reason_code,
                    finding_count = errors.len(),
                    "message rejected by glossary validation"
                );
                Ok(AgentTurn::Rejected { reason_code, user_message, errors })
            }
            GuardrailDecision::Degrade { reason_code, user_message, .. } => {
                info!(
                    event_name = "agent.message.degraded",
                    session_id,
                    reason_code,
                    "message not forwarded"
                );
                Ok(AgentTurn::Rejected { reason_code, user_message, errors: Vec::new() })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use glossgate_core::{GlossaryStore, MessageProcessor, Validator};

    use super::{AgentRuntime, AgentTurn};
    use crate::client::{AgentClient, AgentError, AgentReply, AgentRequest};
    use crate::guardrails::GuardrailPolicy;

    #[derive(Default)]
    struct RecordingClient {
        requests: Mutex<Vec<AgentRequest>>,
    }

    #[async_trait]
    impl AgentClient for RecordingClient {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn send(&self, request: &AgentRequest) -> Result<AgentReply, AgentError> {
            self.requests.lock().expect("lock").push(request.clone());
            Ok(AgentReply { text: "done".to_string() })
        }
    }

    fn runtime(client: Arc<RecordingClient>) -> AgentRuntime {
        let processor =
            MessageProcessor::new(Validator::new(Arc::new(GlossaryStore::builtin())));
        AgentRuntime::new(Arc::new(processor), GuardrailPolicy::default(), client)
    }

    #[tokio::test]
    async fn valid_message_is_forwarded_verbatim() {
        let client = Arc::new(RecordingClient::default());
        let turn = runtime(client.clone())
            .handle_message("s-1", "facturar ZZVENTA en PdV W1")
            .await
            .expect("turn");

        assert_eq!(
            turn,
            AgentTurn::Forwarded {
                session_id: "s-1".to_string(),
                reply: AgentReply { text: "done".to_string() },
            }
        );
        let requests = client.requests.lock().expect("lock");
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].input, "facturar ZZVENTA en PdV W1");
    }

    #[tokio::test]
    async fn invalid_message_never_reaches_the_agent() {
        let client = Arc::new(RecordingClient::default());
        let turn =
            runtime(client.clone()).handle_message("s-2", "ZZCAMPREC I741351").await.expect("turn");

        match turn {
            AgentTurn::Rejected { reason_code, user_message, errors } => {
                assert_eq!(reason_code, "glossary_validation_failed");
                assert_eq!(errors, vec!["Line ZZCAMPREC incompatible with account I741351"]);
                assert!(user_message.contains("- Line ZZCAMPREC incompatible with account I741351"));
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert!(client.requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn blank_message_is_not_forwarded() {
        let client = Arc::new(RecordingClient::default());
        let turn = runtime(client.clone()).handle_message("s-3", "  ").await.expect("turn");

        assert!(matches!(turn, AgentTurn::Rejected { reason_code: "blank_message", .. }));
        assert!(client.requests.lock().expect("lock").is_empty());
    }
}
