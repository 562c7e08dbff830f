use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use glossgate_agent::runtime::{AgentRuntime, AgentTurn};
use glossgate_core::{ApplicationError, InterfaceError, MessageProcessor};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<MessageProcessor>,
    pub agent_runtime: Arc<AgentRuntime>,
}

/// A missing `input` field is validated as the empty message.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub input: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MessageRequest {
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MessageResponse {
    Ok { session_id: String, reply: String },
    Error { reason_code: &'static str, message: String, errors: Vec<String> },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub correlation_id: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/v1/validate", post(validate))
        .route("/v1/messages", post(messages))
        .with_state(state)
}

pub async fn validate(
    State(state): State<AppState>,
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_request("api.validate.rejected", rejection),
    };

    let outcome = state.processor.process(&request.input);
    info!(
        event_name = "api.validate.completed",
        outcome = outcome.status(),
        "message validated"
    );
    Json(outcome).into_response()
}

pub async fn messages(
    State(state): State<AppState>,
    payload: Result<Json<MessageRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return bad_request("api.messages.rejected", rejection),
    };
    let session_id = request.session_id.unwrap_or_else(|| Uuid::new_v4().to_string());

    match state.agent_runtime.handle_message(&session_id, &request.input).await {
        Ok(AgentTurn::Forwarded { session_id, reply }) => {
            Json(MessageResponse::Ok { session_id, reply: reply.text }).into_response()
        }
        Ok(AgentTurn::Rejected { reason_code, user_message, errors }) => {
            Json(MessageResponse::Error { reason_code, message: user_message, errors })
                .into_response()
        }
        Err(agent_error) => {
            let correlation_id = Uuid::new_v4().to_string();
            let interface_error = ApplicationError::Integration(agent_error.to_string())
                .into_interface(correlation_id.clone());
            error!(
                event_name = "api.messages.failed",
                correlation_id = %correlation_id,
                session_id = %session_id,
                error = %interface_error,
                "agent turn failed"
            );
            error_response(StatusCode::BAD_GATEWAY, &interface_error)
        }
    }
}

fn bad_request(event_name: &'static str, rejection: JsonRejection) -> Response {
    let correlation_id = Uuid::new_v4().to_string();
    let interface_error =
        ApplicationError::InvalidRequest(rejection.body_text()).into_interface(correlation_id);
    warn!(
        event_name,
        correlation_id = interface_error.correlation_id(),
        error = %interface_error,
        "request body rejected"
    );
    error_response(StatusCode::BAD_REQUEST, &interface_error)
}

fn error_response(status: StatusCode, interface_error: &InterfaceError) -> Response {
    let body = ErrorBody {
        error: interface_error.user_message(),
        correlation_id: interface_error.correlation_id().to_string(),
    };
    (status, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use glossgate_agent::{
        client::{AgentClient, AgentError, AgentReply, AgentRequest, EchoAgentClient},
        guardrails::GuardrailPolicy,
        runtime::AgentRuntime,
    };
    use glossgate_core::{GlossaryStore, MessageProcessor, Validator};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::{router, AppState};

    struct DownAgent;

    #[async_trait]
    impl AgentClient for DownAgent {
        fn name(&self) -> &'static str {
            "down"
        }

        async fn send(&self, _request: &AgentRequest) -> Result<AgentReply, AgentError> {
            Err(AgentError::Status { status: 503, body: "maintenance".to_string() })
        }
    }

    fn app(client: Arc<dyn AgentClient>) -> Router {
        let processor =
            Arc::new(MessageProcessor::new(Validator::new(Arc::new(GlossaryStore::builtin()))));
        let agent_runtime =
            Arc::new(AgentRuntime::new(processor.clone(), GuardrailPolicy::default(), client));
        router(AppState { processor, agent_runtime })
    }

    async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request");
        let response = app.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn validate_returns_ok_outcome_with_original_text() {
        let (status, body) = post_json(
            app(Arc::new(EchoAgentClient)),
            "/v1/validate",
            json!({ "input": "WIP 12589 ... ZZCAMPREC ... E123456 ... PdV Pa" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": "ok", "text": "WIP 12589 ... ZZCAMPREC ... E123456 ... PdV Pa" })
        );
    }

    #[tokio::test]
    async fn validate_reports_findings_in_order() {
        let (status, body) = post_json(
            app(Arc::new(EchoAgentClient)),
            "/v1/validate",
            json!({ "input": "PdV Q9 and WIP 99999" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "status": "error",
                "errors": [
                    "Work item 99999 out of range (10001-65535)",
                    "Point of sale Q9 not valid"
                ]
            })
        );
    }

    #[tokio::test]
    async fn validate_treats_missing_input_as_empty_message() {
        let (status, body) =
            post_json(app(Arc::new(EchoAgentClient)), "/v1/validate", json!({})).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "text": "" }));
    }

    #[tokio::test]
    async fn malformed_body_maps_to_bad_request_with_correlation_id() {
        let request = Request::builder()
            .method("POST")
            .uri("/v1/validate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"input\": 42"))
            .expect("request");
        let response = app(Arc::new(EchoAgentClient)).oneshot(request).await.expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(
            body["error"],
            "The request could not be processed. Check inputs and try again."
        );
        assert!(body["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn messages_rejects_wrongly_typed_session_id() {
        let (status, body) = post_json(
            app(Arc::new(EchoAgentClient)),
            "/v1/messages",
            json!({ "input": "hello", "session_id": 7 }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["correlation_id"].is_string());
    }

    #[tokio::test]
    async fn messages_forwards_valid_text_and_keeps_session() {
        let (status, body) = post_json(
            app(Arc::new(EchoAgentClient)),
            "/v1/messages",
            json!({ "input": "hello world", "session_id": "abc" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": "ok", "session_id": "abc", "reply": "received: hello world" })
        );
    }

    #[tokio::test]
    async fn messages_generates_session_id_when_absent() {
        let (_, body) =
            post_json(app(Arc::new(EchoAgentClient)), "/v1/messages", json!({ "input": "hola" }))
                .await;

        let session_id = body["session_id"].as_str().expect("session id");
        assert!(uuid::Uuid::parse_str(session_id).is_ok());
    }

    #[tokio::test]
    async fn messages_rejects_invalid_text_without_calling_agent() {
        let (status, body) = post_json(
            app(Arc::new(DownAgent)),
            "/v1/messages",
            json!({ "input": "ZZFAKE" }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert_eq!(body["reason_code"], "glossary_validation_failed");
        assert_eq!(body["errors"], json!(["Line ZZFAKE not recognized"]));
        let message = body["message"].as_str().expect("message");
        assert!(message.ends_with("- Line ZZFAKE not recognized"));
    }

    #[tokio::test]
    async fn messages_maps_agent_failure_to_bad_gateway() {
        let (status, body) = post_json(
            app(Arc::new(DownAgent)),
            "/v1/messages",
            json!({ "input": "hello world" }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(
            body["error"],
            "The assistant is temporarily unavailable. Please retry shortly."
        );
        assert!(body["correlation_id"].as_str().is_some_and(|id| !id.is_empty()));
    }
}
