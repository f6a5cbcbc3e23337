//! Error taxonomy for the turbot client.
//!
//! Every failure a command can produce is a [`TurbotError`]. Nothing is
//! printed where an error is raised; the dispatcher classifies the error at a
//! single boundary and turns it into one user-facing message plus an exit
//! code (see `cli::dispatch::classify`).

use thiserror::Error;

use crate::api::ApiError;
use crate::cli::command::RegistryError;

/// Convenience alias used by handlers.
pub type Result<T, E = TurbotError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TurbotError {
    /// Bad or leftover CLI arguments, detected locally.
    #[error("{0}")]
    Usage(String),

    /// The command name resolved to nothing in the registry.
    #[error("`{command}` is not a turbot command.")]
    UnknownCommand {
        command: String,
        suggestion: Option<String>,
    },

    /// An option was malformed, missing its value or rejected by its hook.
    #[error("{0}")]
    OptionParse(String),

    /// A command decided to stop with a message for the user.
    #[error("{0}")]
    CommandFailed(String),

    /// Failure talking to the Turbot API.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The command table could not be built.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("zip archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl TurbotError {
    /// Shorthand for [`TurbotError::CommandFailed`].
    pub fn failed(message: impl Into<String>) -> Self {
        TurbotError::CommandFailed(message.into())
    }

    /// True when the upstream rejected our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, TurbotError::Api(ApiError::Unauthorized))
    }
}
