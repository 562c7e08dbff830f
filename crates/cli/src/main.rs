use std::process::ExitCode;

fn main() -> ExitCode {
    glossgate_cli::run()
}
