use std::path::PathBuf;
use std::sync::Arc;

use glossgate_core::{MessageProcessor, Validator};

use super::{load_glossary, CommandResult};

/// Exit code 0 when the message is clean, 1 when it has findings and 2 when
/// the configuration or glossary could not be loaded.
pub fn run(input: &str, glossary_path: Option<PathBuf>) -> CommandResult {
    let (config, store) = match load_glossary("validate", glossary_path) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let validator =
        Validator::new(Arc::new(store)).with_strategy(config.glossary.work_item_strategy);
    let outcome = MessageProcessor::new(validator).process(input);

    match serde_json::to_string_pretty(&outcome) {
        Ok(output) => CommandResult { exit_code: if outcome.is_ok() { 0 } else { 1 }, output },
        Err(error) => CommandResult::failure("validate", "serialization", error.to_string(), 2),
    }
}
