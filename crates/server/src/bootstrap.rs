use std::sync::Arc;

use glossgate_agent::{
    client::{client_from_config, AgentError},
    guardrails::GuardrailPolicy,
    runtime::AgentRuntime,
};
use glossgate_core::config::AppConfig;
use glossgate_core::validation::TracingSink;
use glossgate_core::{ApplicationError, GlossaryStore, MessageProcessor, Validator};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub glossary: Arc<GlossaryStore>,
    pub processor: Arc<MessageProcessor>,
    pub agent_runtime: Arc<AgentRuntime>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("glossary could not be loaded: {0}")]
    Glossary(#[source] ApplicationError),
    #[error("agent client could not be initialized: {0}")]
    Agent(#[source] AgentError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let glossary = config
        .glossary
        .load_store()
        .map_err(|error| BootstrapError::Glossary(ApplicationError::from(error)))?;
    let glossary = Arc::new(glossary);
    info!(
        event_name = "system.bootstrap.glossary_loaded",
        correlation_id = "bootstrap",
        glossary_version = glossary.version(),
        work_item_strategy = ?config.glossary.work_item_strategy,
        "glossary loaded"
    );

    let validator = Validator::new(glossary.clone())
        .with_strategy(config.glossary.work_item_strategy)
        .with_sink(Arc::new(TracingSink));
    let processor = Arc::new(MessageProcessor::new(validator));

    let client = client_from_config(&config.agent).map_err(BootstrapError::Agent)?;
    info!(
        event_name = "system.bootstrap.agent_ready",
        correlation_id = "bootstrap",
        agent_client = client.name(),
        "agent client initialized"
    );

    let agent_runtime =
        Arc::new(AgentRuntime::new(processor.clone(), GuardrailPolicy::default(), client));

    Ok(Application { config, glossary, processor, agent_runtime })
}
