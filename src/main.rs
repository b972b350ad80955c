//! termreel - scripted terminal demo recorder

mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use termreel::cli::{Cli, Commands, ConfigCommands};

/// `RUST_LOG` wins, then `TERMREEL_LOG`, then warnings only.
fn log_filter() -> EnvFilter {
    let level = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("TERMREEL_LOG"))
        .unwrap_or_else(|_| "warn".to_string());

    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match cli.command {
        Commands::Run(args) => commands::run::handle(args),
        Commands::Config(cmd) => match cmd {
            ConfigCommands::Show { config } => {
                commands::config::handle_show(config.as_deref()).map(|_| ExitCode::SUCCESS)
            }
            ConfigCommands::Init { force } => {
                commands::config::handle_init(force).map(|_| ExitCode::SUCCESS)
            }
        },
        Commands::Completions { shell } => {
            commands::completions::handle(shell);
            Ok(ExitCode::SUCCESS)
        }
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
