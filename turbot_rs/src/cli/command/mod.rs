//! Command descriptors, the registry that owns them, and help rendering.
//!
//! - `doc`: doc-block extraction (banner, summary, options)
//! - `options`: `OptionSpec`, global options, parsed option values
//! - `registry`: the command/alias/namespace table
//! - `types`: descriptor types and the handler signature
//! - `help`: root and per-command help output

mod doc;
pub mod help;
mod options;
mod registry;
mod types;

pub use doc::{DocBlock, Locator, SourceCache, extract_comment_block};
pub use options::{OptionHook, OptionSpec, OptionValue, Options, global_options};
pub use registry::{Registry, RegistryError};
pub use types::{CommandDescriptor, Handler, NamespaceDescriptor, Visibility};
