use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use glossgate_core::config::AgentConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRequest {
    pub session_id: String,
    pub input: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentReply {
    #[serde(alias = "reply", alias = "output")]
    pub text: String,
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("agent client could not be built: {0}")]
    Build(#[source] reqwest::Error),
    #[error("agent transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("agent returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("agent response could not be decoded: {0}")]
    Decode(#[source] reqwest::Error),
}

impl AgentError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Build(_) | Self::Decode(_) => false,
        }
    }
}

#[async_trait]
pub trait AgentClient: Send + Sync {
    fn name(&self) -> &'static str;
    async fn send(&self, request: &AgentRequest) -> Result<AgentReply, AgentError>;
}

/// Stand-in used when no agent endpoint is configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct EchoAgentClient;

#[async_trait]
impl AgentClient for EchoAgentClient {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn send(&self, request: &AgentRequest) -> Result<AgentReply, AgentError> {
        Ok(AgentReply { text: format!("received: {}", request.input) })
    }
}

pub struct HttpAgentClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
    max_retries: u32,
    base_backoff: Duration,
}

impl HttpAgentClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<SecretString>,
        timeout: Duration,
        max_retries: u32,
    ) -> Result<Self, AgentError> {
        let client =
            reqwest::Client::builder().timeout(timeout).build().map_err(AgentError::Build)?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
            max_retries,
            base_backoff: Duration::from_millis(250),
        })
    }

    pub fn with_backoff(mut self, base_backoff: Duration) -> Self {
        self.base_backoff = base_backoff;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_once(&self, request: &AgentRequest) -> Result<AgentReply, AgentError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key.expose_secret());
        }

        let response = builder.send().await.map_err(AgentError::Transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status { status: status.as_u16(), body });
        }

        response.json::<AgentReply>().await.map_err(AgentError::Decode)
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, request: &AgentRequest) -> Result<AgentReply, AgentError> {
        let mut attempt = 0u32;
        loop {
            match self.send_once(request).await {
                Ok(reply) => return Ok(reply),
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    let delay = self.base_backoff.saturating_mul(2u32.saturating_pow(attempt));
                    warn!(
                        event_name = "agent.request.retry",
                        session_id = %request.session_id,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "agent request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        }
    }
}

/// HTTP client when an endpoint is configured, echo client otherwise.
pub fn client_from_config(config: &AgentConfig) -> Result<Arc<dyn AgentClient>, AgentError> {
    match &config.endpoint {
        Some(endpoint) => Ok(Arc::new(HttpAgentClient::new(
            endpoint.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
            config.max_retries,
        )?)),
        None => Ok(Arc::new(EchoAgentClient)),
    }
}
