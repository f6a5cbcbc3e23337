//! Shared CLI entry point for the `turbot` binary.
//!
//! Builds the command table and settings once, then hands the first
//! argument (default `help`) and the rest of argv to the dispatcher.

use tracing::debug;

use crate::commands;
use crate::config::{LOG_ENV, Settings};
use crate::console::Console;

use super::dispatch::Dispatcher;

/// Install the stderr log subscriber. `TURBOT_LOG` holds the filter; the
/// default only shows warnings.
pub fn init_logging() {
    // Logs MUST go to stderr, stdout carries command output.
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Split argv (without the program name) into command and arguments.
pub fn split_argv(raw_args: &[String]) -> (String, Vec<String>) {
    match raw_args.split_first() {
        Some((command, rest)) if !command.trim().is_empty() => {
            (command.trim().to_string(), rest.to_vec())
        }
        Some((_, rest)) => ("help".to_string(), rest.to_vec()),
        None => ("help".to_string(), Vec::new()),
    }
}

/// Run the CLI. This is the whole main() body; returns the exit code.
pub fn run() -> i32 {
    init_logging();

    // nosemgrep: rust.lang.security.args.args
    // args() only names the command to run; the executable path is skipped.
    let raw_args: Vec<String> = std::env::args().skip(1).collect();
    let (command, args) = split_argv(&raw_args);

    let settings = Settings::from_env();
    let mut console = Console::stdio(settings.color);

    let registry = match commands::load() {
        Ok(registry) => registry,
        Err(e) => {
            console.error(&format!("Unable to load commands: {}", e));
            return 1;
        }
    };
    debug!(commands = registry.len(), host = %settings.host, "registry loaded");

    Dispatcher::new(&registry, &settings, &mut console).run(&command, &args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_to_help() {
        assert_eq!(split_argv(&[]), ("help".to_string(), vec![]));
        assert_eq!(
            split_argv(&args(&["  ", "x"])),
            ("help".to_string(), args(&["x"]))
        );
    }

    #[test]
    fn test_command_is_trimmed() {
        assert_eq!(
            split_argv(&args(&[" bots:info ", "--bot", "b"])),
            ("bots:info".to_string(), args(&["--bot", "b"]))
        );
    }
}
