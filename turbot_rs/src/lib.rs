//! # turbot
//!
//! **Command-line client for the Turbot bot-hosting platform.**
//!
//! The client authenticates against the Turbot API, registers bots, pushes
//! bot code as zip archives, validates a bot's JSON output locally and streams
//! that output to the remote preview service. All scheduling, storage and data
//! rules live server-side; this crate is argument parsing, credential
//! management, HTTP request shaping and local file packaging.
//!
//! ## Architecture
//!
//! ```text
//! argv ──▶ cli::entrypoint ──▶ Dispatcher::run ──▶ Registry::resolve
//!                                   │                    │
//!                                   ▼                    ▼
//!                             OptionParser        CommandDescriptor
//!                                   │                    │
//!                                   └──▶ CommandContext ─┴──▶ handler fn
//!                                              │
//!                                 Console / ApiClient / Manifest
//! ```
//!
//! ## Library usage
//!
//! ```rust,no_run
//! use turbot::cli::dispatch::Dispatcher;
//! use turbot::config::Settings;
//! use turbot::console::Console;
//!
//! let registry = turbot::commands::load().expect("command table");
//! let settings = Settings::from_env();
//! let mut console = Console::stdio(settings.color);
//! let code = Dispatcher::new(&registry, &settings, &mut console).run("help", &[]);
//! std::process::exit(code);
//! ```

// ============================================================================
// Core Modules
// ============================================================================

/// HTTP client for the Turbot API and upstream error-body extraction.
pub mod api;

/// Zip packaging of bot code for `bots:push`.
pub mod archive;

/// Command registry, option parser, dispatcher and process entry point.
///
/// # Submodules
///
/// - [`cli::command`] - descriptors, doc-block extraction, registry, help rendering
/// - [`cli::parser`] - POSIX-style option parser and command suggestions
/// - [`cli::dispatch`] - `prepare_run`/`run`, failure classification, command context
/// - [`cli::entrypoint`] - shared `main()` body
pub mod cli;

/// ANSI styling for terminal output.
pub mod colors;

/// Command handlers (`auth`, `bots`, `help`, `status`, `version`).
pub mod commands;

/// Settings resolved from defaults, the config file and the environment.
pub mod config;

/// User-facing output and prompts.
pub mod console;

/// `.netrc` credential store.
pub mod credentials;

/// Error taxonomy shared by every command.
pub mod error;

/// Local `manifest.json` model.
pub mod manifest;

/// Scraper subprocess runner and record handlers.
pub mod runner;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use cli::command::{CommandDescriptor, NamespaceDescriptor, OptionSpec, Registry};
pub use cli::dispatch::Dispatcher;
pub use config::Settings;
pub use console::Console;
pub use error::TurbotError;

/// Version string reported by `turbot version` and sent as the `User-Agent`.
pub fn user_agent() -> String {
    format!(
        "turbot/{} ({}-{})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::ARCH,
        std::env::consts::OS
    )
}
