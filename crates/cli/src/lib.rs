pub mod commands;

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "glossgate",
    about = "Glossgate operator CLI",
    long_about = "Validate messages against the business glossary, inspect glossary data and configuration, and run readiness checks.",
    after_help = "Examples:\n  glossgate validate \"WIP 12589 ZZCAMPREC E123456\"\n  echo \"PdV Q9\" | glossgate validate\n  glossgate glossary --glossary glossary.toml\n  glossgate doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate a message (argument or stdin) and print the outcome as JSON")]
    Validate {
        #[arg(help = "Message text; read from stdin when omitted")]
        text: Option<String>,
        #[arg(long, help = "Glossary document to validate against instead of the configured one")]
        glossary: Option<PathBuf>,
    },
    #[command(about = "Load the glossary and print a JSON summary of its reference data")]
    Glossary {
        #[arg(long, help = "Glossary document to load instead of the configured one")]
        glossary: Option<PathBuf>,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, glossary loading, and agent client readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_target(false)
        .with_max_level(tracing::Level::WARN)
        .try_init();

    let cli = Cli::parse();

    let result = match cli.command {
        Command::Validate { text, glossary } => match read_input(text) {
            Ok(input) => commands::validate::run(&input, glossary),
            Err(error) => {
                commands::CommandResult::failure("validate", "input", format!("{error:#}"), 2)
            }
        },
        Command::Glossary { glossary } => commands::glossary::run(glossary),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn read_input(text: Option<String>) -> anyhow::Result<String> {
    if let Some(text) = text {
        return Ok(text);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer).context("failed to read message from stdin")?;
    // A single trailing newline comes from the shell, not the message.
    let message = match buffer.strip_suffix('\n') {
        Some(stripped) => stripped.strip_suffix('\r').unwrap_or(stripped),
        None => &buffer,
    };
    Ok(message.to_string())
}
