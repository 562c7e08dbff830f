use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::Utc;
use glossgate_core::GlossaryStore;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    pub glossary: Arc<GlossaryStore>,
    pub agent_client: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub glossary: HealthCheck,
    pub agent: HealthCheck,
    pub checked_at: String,
}

pub fn router(state: HealthState) -> Router {
    Router::new().route("/health", get(health)).with_state(state)
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let glossary = glossary_check(&state.glossary);
    let ready = glossary.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "glossgate-server runtime initialized".to_string(),
        },
        glossary,
        agent: HealthCheck {
            status: "ready",
            detail: format!("agent client `{}` configured", state.agent_client),
        },
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

// An empty glossary rejects every line, account and point of sale it sees.
fn glossary_check(glossary: &GlossaryStore) -> HealthCheck {
    let summary = glossary.summary();
    if summary.line_count == 0 && summary.account_count == 0 && summary.pdv_count == 0 {
        return HealthCheck {
            status: "degraded",
            detail: format!("glossary `{}` has no reference entries", summary.version),
        };
    }

    HealthCheck {
        status: "ready",
        detail: format!(
            "glossary `{}` loaded: {} lines, {} accounts, {} points of sale, {} rule(s)",
            summary.version,
            summary.line_count,
            summary.account_count,
            summary.pdv_count,
            summary.rules.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{extract::State, http::StatusCode, Json};
    use glossgate_core::GlossaryStore;

    use crate::health::{health, HealthState};

    #[tokio::test]
    async fn health_returns_ready_with_builtin_glossary() {
        let state =
            HealthState { glossary: Arc::new(GlossaryStore::builtin()), agent_client: "echo" };

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.status, "ready");
        assert_eq!(payload.glossary.status, "ready");
        assert!(payload
            .glossary
            .detail
            .contains("3 lines, 2 accounts, 3 points of sale, 1 rule(s)"));
        assert_eq!(payload.agent.detail, "agent client `echo` configured");
    }

    #[tokio::test]
    async fn health_is_degraded_when_glossary_is_empty() {
        let glossary = GlossaryStore::from_toml_str(
            "version = \"empty\"\n[work_items]\nmin = 1\nmax = 2\n",
        )
        .expect("empty glossary parses");
        let state = HealthState { glossary: Arc::new(glossary), agent_client: "http" };

        let (status, Json(payload)) = health(State(state)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(payload.status, "degraded");
        assert_eq!(payload.glossary.status, "degraded");
        assert_eq!(payload.service.status, "ready");
    }
}
