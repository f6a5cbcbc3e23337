//! Command-line interface: registry, option parser and dispatcher.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                  User Input (turbot CMD ARGS)                │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Dispatcher                           │
//! │  help rewrite ─▶ Registry::resolve ─▶ parse_arguments        │
//! │        │                 │                   │               │
//! │        │        UnknownCommand + suggest     │ leftovers     │
//! │        ▼                 ▼                   ▼               │
//! │             classify failures ◀── CommandContext             │
//! └──────────────────────────────────────────────────────────────┘
//!                                │
//!                                ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │         Command handlers (commands::auth, bots, ...)         │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Module Structure
//!
//! - [`command`] - descriptors, doc blocks, the registry and help rendering
//! - [`parser`] - option parsing with leftover collection, suggestions
//! - [`dispatch`] - `prepare_run`/`run`, failure classification, command context
//! - [`entrypoint`] - the body of `main()`

pub mod command;
pub mod dispatch;
pub mod entrypoint;
pub mod parser;

pub use command::{
    CommandDescriptor, DocBlock, Handler, NamespaceDescriptor, OptionSpec, Options, Registry,
    RegistryError, Visibility,
};
pub use dispatch::{CommandContext, Dispatcher, Prepared};
pub use parser::{parse_arguments, suggest};
