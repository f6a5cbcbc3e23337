//! The command table.
//!
//! Built once at startup by `commands::load`, then only read. Re-registering
//! a key replaces the earlier descriptor. Aliases map to canonical keys and
//! are resolved with a single lookup.

use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use super::types::{CommandDescriptor, NamespaceDescriptor, Visibility};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("no such command: {0}")]
    NoSuchCommand(String),

    #[error("unable to extract help from locator: {0}")]
    MalformedLocator(String),

    #[error("command `{0}` has no banner")]
    EmptyBanner(String),

    #[error("cannot read {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Default)]
pub struct Registry {
    commands: BTreeMap<String, CommandDescriptor>,
    aliases: BTreeMap<String, String>,
    namespaces: BTreeMap<String, NamespaceDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace by key. Keys containing `_` also get a `-` alias.
    pub fn register_command(&mut self, descriptor: CommandDescriptor) {
        let key = descriptor.command.clone();
        debug!(command = %key, "registering command");
        self.commands.insert(key.clone(), descriptor);
        if key.contains('_') {
            self.aliases.insert(key.replace('_', "-"), key);
        }
    }

    pub fn register_namespace(&mut self, namespace: NamespaceDescriptor) {
        self.namespaces.insert(namespace.name.clone(), namespace);
    }

    /// Map `alias` to an already registered `canonical` key.
    pub fn register_alias(&mut self, alias: &str, canonical: &str) -> Result<(), RegistryError> {
        if !self.commands.contains_key(canonical) {
            return Err(RegistryError::NoSuchCommand(canonical.to_string()));
        }
        self.aliases.insert(alias.to_string(), canonical.to_string());
        Ok(())
    }

    /// Descriptor for `key`, directly or through one alias.
    pub fn resolve(&self, key: &str) -> Option<&CommandDescriptor> {
        self.commands
            .get(key)
            .or_else(|| self.aliases.get(key).and_then(|c| self.commands.get(c)))
    }

    /// Descriptor registered under exactly `key`.
    pub fn get(&self, key: &str) -> Option<&CommandDescriptor> {
        self.commands.get(key)
    }

    /// Canonical key an alias points at.
    pub fn alias_target(&self, alias: &str) -> Option<&str> {
        self.aliases.get(alias).map(String::as_str)
    }

    /// Mark a registered command internal; it disappears at the next sweep.
    pub fn hide(&mut self, key: &str) -> Result<(), RegistryError> {
        match self.commands.get_mut(key) {
            Some(descriptor) => {
                descriptor.visibility = Visibility::Internal;
                Ok(())
            }
            None => Err(RegistryError::NoSuchCommand(key.to_string())),
        }
    }

    /// Drop internal commands and aliases left pointing at nothing.
    /// Returns the removed command keys.
    pub fn sweep_internal(&mut self) -> Vec<String> {
        let removed: Vec<String> = self
            .commands
            .values()
            .filter(|c| c.is_internal())
            .map(|c| c.command.clone())
            .collect();
        for key in &removed {
            self.commands.remove(key);
        }
        let commands = &self.commands;
        self.aliases.retain(|_, target| commands.contains_key(target));
        if !removed.is_empty() {
            debug!(removed = ?removed, "swept internal commands");
        }
        removed
    }

    pub fn commands(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.values()
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &NamespaceDescriptor> {
        self.namespaces.values()
    }

    pub fn namespace(&self, name: &str) -> Option<&NamespaceDescriptor> {
        self.namespaces.get(name)
    }

    /// Every invocable key: commands then aliases.
    pub fn keys(&self) -> Vec<&str> {
        self.commands
            .keys()
            .chain(self.aliases.keys())
            .map(String::as_str)
            .collect()
    }

    /// Commands in `namespace` other than the namespace's own command.
    pub fn commands_in_namespace(&self, namespace: &str) -> Vec<&CommandDescriptor> {
        self.commands
            .values()
            .filter(|c| c.namespace == namespace && c.command != namespace)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::dispatch::CommandContext;
    use crate::error::Result;

    fn first(_: &mut CommandContext<'_>) -> Result<()> {
        Ok(())
    }

    fn second(_: &mut CommandContext<'_>) -> Result<()> {
        Err(crate::error::TurbotError::failed("second"))
    }

    fn descriptor(key: &str, doc: &str, handler: crate::cli::command::Handler) -> CommandDescriptor {
        CommandDescriptor::new(key, doc, handler).expect("descriptor")
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = Registry::new();
        registry.register_command(descriptor("bots", "bots\n\nfirst", first));
        registry.register_command(descriptor("bots", "bots\n\nsecond", second));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("bots").expect("bots").summary, "second");
    }

    #[test]
    fn test_alias_resolution_is_single_hop() {
        let mut registry = Registry::new();
        registry.register_command(descriptor("bots", "bots", first));
        registry.register_alias("list", "bots").expect("alias");

        let direct = registry.resolve("bots").expect("bots");
        let aliased = registry.resolve("list").expect("list");
        assert_eq!(direct.command, aliased.command);

        // `ls` -> `list` is rejected: `list` is not a command key.
        assert!(matches!(
            registry.register_alias("ls", "list"),
            Err(RegistryError::NoSuchCommand(_))
        ));
        assert!(registry.resolve("ls").is_none());
    }

    #[test]
    fn test_alias_to_missing_command_fails() {
        let mut registry = Registry::new();
        let err = registry.register_alias("x", "nope").unwrap_err();
        assert_eq!(err.to_string(), "no such command: nope");
    }

    #[test]
    fn test_underscore_keys_get_dash_alias() {
        let mut registry = Registry::new();
        registry.register_command(descriptor("bots:dry_run", "bots:dry_run", first));
        assert_eq!(registry.alias_target("bots:dry-run"), Some("bots:dry_run"));
        assert!(registry.resolve("bots:dry-run").is_some());
    }

    #[test]
    fn test_sweep_removes_hidden_commands_only() {
        let mut registry = Registry::new();
        registry.register_command(descriptor("bots", "bots", first));
        registry.register_command(descriptor("bots:secret", "bots:secret", first));
        registry.register_alias("secret", "bots:secret").expect("alias");
        registry.hide("bots:secret").expect("hide");

        let removed = registry.sweep_internal();

        assert_eq!(removed, vec!["bots:secret"]);
        assert!(registry.resolve("bots:secret").is_none());
        assert!(registry.resolve("secret").is_none());
        assert!(registry.resolve("bots").is_some());
    }

    #[test]
    fn test_descriptor_marked_internal_at_registration_is_swept() {
        let mut registry = Registry::new();
        registry.register_command(descriptor("auth:prompt", "auth:prompt", first).internal());
        registry.sweep_internal();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_keys_and_namespace_listing() {
        let mut registry = Registry::new();
        registry.register_command(descriptor("bots", "bots", first));
        registry.register_command(descriptor("bots:info", "bots:info", first));
        registry.register_command(descriptor("auth:login", "auth:login", first));
        registry.register_alias("info", "bots:info").expect("alias");

        assert_eq!(
            registry.keys(),
            vec!["auth:login", "bots", "bots:info", "info"]
        );
        let in_bots: Vec<&str> = registry
            .commands_in_namespace("bots")
            .iter()
            .map(|c| c.command.as_str())
            .collect();
        assert_eq!(in_bots, vec!["bots:info"]);
    }

    #[test]
    fn test_hide_unknown_command() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.hide("ghost"),
            Err(RegistryError::NoSuchCommand(_))
        ));
    }
}
