//! Command handlers and their registration.
//!
//! Each module owns one namespace: its doc blocks, handler functions and a
//! `register` function adding them to the [`Registry`].

pub mod auth;
pub mod bots;
pub mod format;
pub mod help;
pub mod status;
pub mod templates;
pub mod version;

use tracing::debug;

use crate::cli::command::{Registry, RegistryError};

/// Build the full command table.
pub fn load() -> Result<Registry, RegistryError> {
    let mut registry = Registry::new();
    auth::register(&mut registry)?;
    bots::register(&mut registry)?;
    help::register(&mut registry)?;
    status::register(&mut registry)?;
    version::register(&mut registry)?;

    let swept = registry.sweep_internal();
    debug!(
        commands = registry.commands().count(),
        aliases = registry.aliases().len(),
        swept = swept.len(),
        "command table built"
    );
    Ok(registry)
}
