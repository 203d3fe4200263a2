//! CLI entry point: wires the configured binary image and architecture spec
//! into an interactive debug shell.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use vm16::config::Config;
use vm16::shell::{self, ShellOutcome};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match Config::from_args(args) {
        Ok(config) => config,
        Err(message) => {
            eprintln!("argument error: {message}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.verbose);

    let mut shell = match shell::boot(config.clone()) {
        Ok(shell) => shell,
        Err(e) => {
            error!(error = %e, "failed to boot VM");
            return ExitCode::FAILURE;
        }
    };

    for command in config.commands.clone() {
        if run_segment(&mut shell, &command).is_break() {
            return ExitCode::SUCCESS;
        }
    }

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        if run_segment(&mut shell, &line).is_break() {
            break;
        }
    }

    info!("session ended");
    ExitCode::SUCCESS
}

fn run_segment(shell: &mut shell::Shell, line: &str) -> std::ops::ControlFlow<()> {
    match shell.send_line(line) {
        Ok(ShellOutcome::Text(text)) => {
            print!("{text}");
            let _ = io::stdout().flush();
            std::ops::ControlFlow::Continue(())
        }
        Ok(ShellOutcome::Quit) => std::ops::ControlFlow::Break(()),
        Err(e) => {
            eprintln!("{e}");
            std::ops::ControlFlow::Continue(())
        }
    }
}
