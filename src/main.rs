//! Questline CLI - inspect quest progression data

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = questline::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
