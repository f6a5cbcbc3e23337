//! Turbot API access.

pub mod client;
pub mod error;

pub use client::{ApiClient, BotSummary, DraftDataReceipt};
pub use error::{ApiError, INTERNAL_SERVER_ERROR, extract_error};
