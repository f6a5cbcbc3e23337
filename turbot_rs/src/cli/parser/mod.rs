//! Option parsing for `turbot <command> [args]` invocations.
//!
//! - [`core`] - left-to-right option parser that collects leftovers
//! - [`helpers`] - edit-distance command suggestions
//!
//! ```ignore
//! use turbot::cli::command::global_options;
//! use turbot::cli::parser::parse_arguments;
//!
//! let parsed = parse_arguments(&global_options(), &args)?;
//! for leftover in parsed.leftovers { /* positional or unknown */ }
//! ```

mod core;
mod helpers;

pub use self::core::{ParsedArgs, parse_arguments};
pub use self::helpers::{SUGGESTION_THRESHOLD, suggest};
