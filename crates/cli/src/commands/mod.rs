pub mod config;
pub mod doctor;
pub mod glossary;
pub mod validate;

use std::path::PathBuf;

use glossgate_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use glossgate_core::GlossaryStore;
use serde::Serialize;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

/// Loads configuration, with `glossary_path` taking precedence over every
/// other source, and then the glossary it points at.
pub(crate) fn load_glossary(
    command: &str,
    glossary_path: Option<PathBuf>,
) -> Result<(AppConfig, GlossaryStore), CommandResult> {
    let options = LoadOptions {
        overrides: ConfigOverrides { glossary_path, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    };
    let config = AppConfig::load(options).map_err(|error| {
        CommandResult::failure(command, "config_validation", error.to_string(), 2)
    })?;
    let store = config
        .glossary
        .load_store()
        .map_err(|error| CommandResult::failure(command, "glossary_load", error.to_string(), 2))?;
    Ok((config, store))
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
