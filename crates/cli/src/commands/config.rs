use std::env;
use std::fs;
use std::path::Path;

use glossgate_core::config::{resolve_config_path, AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct Field {
    key: &'static str,
    value: String,
    env_keys: &'static [&'static str],
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in effective_fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(format!("- {} = {} (source: {source})", field.key, field.value));
    }

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<Field> {
    let glossary_path = config
        .glossary
        .path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<builtin>".to_string());
    let api_key = config
        .agent
        .api_key
        .as_ref()
        .map(|key| redact_secret(key.expose_secret()))
        .unwrap_or_else(|| "<unset>".to_string());

    vec![
        Field {
            key: "glossary.path",
            value: glossary_path,
            env_keys: &["GLOSSGATE_GLOSSARY_PATH"],
        },
        Field {
            key: "glossary.work_item_strategy",
            value: format!("{:?}", config.glossary.work_item_strategy),
            env_keys: &["GLOSSGATE_GLOSSARY_WORK_ITEM_STRATEGY"],
        },
        Field {
            key: "agent.endpoint",
            value: config.agent.endpoint.clone().unwrap_or_else(|| "<unset>".to_string()),
            env_keys: &["GLOSSGATE_AGENT_ENDPOINT"],
        },
        Field { key: "agent.api_key", value: api_key, env_keys: &["GLOSSGATE_AGENT_API_KEY"] },
        Field {
            key: "agent.timeout_secs",
            value: config.agent.timeout_secs.to_string(),
            env_keys: &["GLOSSGATE_AGENT_TIMEOUT_SECS"],
        },
        Field {
            key: "agent.max_retries",
            value: config.agent.max_retries.to_string(),
            env_keys: &["GLOSSGATE_AGENT_MAX_RETRIES"],
        },
        Field {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            env_keys: &["GLOSSGATE_SERVER_BIND_ADDRESS"],
        },
        Field {
            key: "server.port",
            value: config.server.port.to_string(),
            env_keys: &["GLOSSGATE_SERVER_PORT"],
        },
        Field {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            env_keys: &["GLOSSGATE_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        },
        Field {
            key: "logging.level",
            value: config.logging.level.clone(),
            env_keys: &["GLOSSGATE_LOGGING_LEVEL", "GLOSSGATE_LOG_LEVEL"],
        },
        Field {
            key: "logging.format",
            value: format!("{:?}", config.logging.format),
            env_keys: &["GLOSSGATE_LOGGING_FORMAT", "GLOSSGATE_LOG_FORMAT"],
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    match trimmed.char_indices().nth(4) {
        Some((cut, _)) if trimmed.len() > 8 => format!("{}***", &trimmed[..cut]),
        _ => "<redacted>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::redact_secret;

    #[test]
    fn redaction_keeps_only_a_short_prefix() {
        assert_eq!(redact_secret("sk-live-abcdef123456"), "sk-l***");
        assert_eq!(redact_secret("short"), "<redacted>");
        assert_eq!(redact_secret("   "), "<empty>");
    }
}
