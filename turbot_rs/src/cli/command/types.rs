//! Descriptor types held by the registry.

use std::fmt;

use super::doc::DocBlock;
use super::options::{OptionHook, OptionSpec};
use super::registry::RegistryError;
use crate::cli::dispatch::CommandContext;
use crate::error::Result;

/// Function a command key is bound to.
pub type Handler = fn(&mut CommandContext<'_>) -> Result<()>;

/// Whether a registered command stays in the catalogue after loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    /// Registered so the doc block is parsed, removed by `sweep_internal`.
    Internal,
}

/// One registered command.
#[derive(Clone)]
pub struct CommandDescriptor {
    /// Registry key, e.g. `bots:info`.
    pub command: String,
    /// Text before the first `:` (or the whole key), e.g. `bots`.
    pub namespace: String,
    pub handler: Handler,
    pub banner: String,
    pub help: String,
    pub summary: String,
    pub description: String,
    pub options: Vec<OptionSpec>,
    pub visibility: Visibility,
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("command", &self.command)
            .field("namespace", &self.namespace)
            .field("banner", &self.banner)
            .field("summary", &self.summary)
            .field("options", &self.options)
            .field("visibility", &self.visibility)
            .finish_non_exhaustive()
    }
}

impl CommandDescriptor {
    /// Descriptor for `command` documented by the doc block `doc`.
    pub fn new(command: &str, doc: &str, handler: Handler) -> Result<Self, RegistryError> {
        Self::from_doc(command, DocBlock::parse(doc), handler)
    }

    pub fn from_doc(
        command: &str,
        doc: DocBlock,
        handler: Handler,
    ) -> Result<Self, RegistryError> {
        if doc.banner.is_empty() {
            return Err(RegistryError::EmptyBanner(command.to_string()));
        }
        Ok(Self {
            command: command.to_string(),
            namespace: Self::namespace_of(command).to_string(),
            handler,
            banner: doc.banner,
            help: doc.help,
            summary: doc.summary,
            description: doc.description,
            options: doc.options,
            visibility: Visibility::Public,
        })
    }

    pub fn namespace_of(command: &str) -> &str {
        command.split(':').next().unwrap_or(command)
    }

    /// Attach a validation hook to the declared option `name`.
    pub fn with_hook(mut self, name: &str, hook: OptionHook) -> Self {
        if let Some(option) = self.options.iter_mut().find(|o| o.name == name) {
            option.hook = Some(hook);
        }
        self
    }

    pub fn internal(mut self) -> Self {
        self.visibility = Visibility::Internal;
        self
    }

    pub fn is_internal(&self) -> bool {
        self.visibility == Visibility::Internal
    }
}

/// A command group shown in root help.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceDescriptor {
    pub name: String,
    pub description: String,
}

impl NamespaceDescriptor {
    /// Namespace described by the first line of `doc`.
    pub fn new(name: &str, doc: &str) -> Self {
        Self {
            name: name.to_string(),
            description: doc.lines().next().unwrap_or_default().trim().to_string(),
        }
    }
}
