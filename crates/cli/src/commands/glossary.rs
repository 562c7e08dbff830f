use std::path::PathBuf;

use super::{load_glossary, CommandResult};

pub fn run(glossary_path: Option<PathBuf>) -> CommandResult {
    let (_, store) = match load_glossary("glossary", glossary_path) {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    match serde_json::to_string_pretty(&store.summary()) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("glossary", "serialization", error.to_string(), 2),
    }
}
