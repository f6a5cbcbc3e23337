//! HTTP-layer errors and upstream error-body extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Fallback when an upstream body carries no usable message.
pub const INTERNAL_SERVER_ERROR: &str =
    "Internal server error.\nRun `turbot status` to check for known platform issues.";

/// Fallback for 404 bodies that do not name what was missing.
pub const RESOURCE_NOT_FOUND: &str = "Resource not found";

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: credentials rejected.
    #[error("authentication failure")]
    Unauthorized,

    /// 404.
    #[error("resource not found")]
    NotFound {
        body: String,
        content_type: Option<String>,
    },

    /// 408 or a client-side timeout.
    #[error("API request timed out")]
    Timeout,

    /// Any other non-2xx status.
    #[error("API request failed with status {status}")]
    RequestFailed {
        status: u16,
        body: String,
        content_type: Option<String>,
    },

    /// DNS, refused connection, TLS handshake.
    #[error("unable to connect: {0}")]
    Connect(String),

    /// A 2xx response we could not make sense of.
    #[error("unexpected API response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Build the error for a non-2xx response.
    pub fn from_status(status: u16, body: String, content_type: Option<String>) -> Self {
        match status {
            401 => ApiError::Unauthorized,
            404 => ApiError::NotFound { body, content_type },
            408 => ApiError::Timeout,
            _ => ApiError::RequestFailed {
                status,
                body,
                content_type,
            },
        }
    }

    /// Map transport failures from reqwest.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() || err.is_request() {
            ApiError::Connect(err.to_string())
        } else {
            ApiError::Decode(err.to_string())
        }
    }

    /// The message shown to the user for this upstream failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::NotFound { body, content_type } => {
                let fallback = not_found_default(body);
                extract_error(body, content_type.as_deref(), &fallback)
            }
            ApiError::RequestFailed {
                body, content_type, ..
            } => extract_error(body, content_type.as_deref(), INTERNAL_SERVER_ERROR),
            ApiError::Timeout => "API request timed out. Please try again, or contact \
                                  bots@opencorporates.com if this issue persists."
                .to_string(),
            ApiError::Connect(_) => {
                "Unable to connect to Turbot API, please check internet connectivity and try again."
                    .to_string()
            }
            ApiError::Unauthorized => "Authentication failure".to_string(),
            ApiError::Decode(detail) => detail.clone(),
        }
    }
}

static XML_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<error>(.*?)</error>").expect("static regex"));
static NOT_FOUND_PHRASE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([\w\s]+ not found)\.?$").expect("static regex"));

/// Pull a human message out of an upstream error body.
///
/// Tries an XML `<errors><error>…</error></errors>` list, then a JSON object
/// with `error` or `message`, then the raw body when the content type is
/// `text/plain`. Falls back to `default`.
pub fn extract_error(body: &str, content_type: Option<&str>, default: &str) -> String {
    parse_error_xml(body)
        .or_else(|| parse_error_json(body))
        .or_else(|| parse_error_plain(body, content_type))
        .unwrap_or_else(|| default.to_string())
}

pub fn parse_error_xml(body: &str) -> Option<String> {
    if !body.contains("<errors") {
        return None;
    }
    let errors: Vec<String> = XML_ERROR
        .captures_iter(body)
        .filter_map(|c| c.get(1).map(|m| m.as_str().trim().to_string()))
        .filter(|m| !m.is_empty())
        .collect();
    if errors.is_empty() {
        None
    } else {
        Some(errors.join("\n"))
    }
}

pub fn parse_error_json(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    ["error", "message"]
        .iter()
        .filter_map(|key| object.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

pub fn parse_error_plain(body: &str, content_type: Option<&str>) -> Option<String> {
    let is_plain = content_type
        .map(|ct| ct.trim().to_ascii_lowercase().starts_with("text/plain"))
        .unwrap_or(false);
    let body = body.trim();
    if is_plain && !body.is_empty() {
        Some(body.to_string())
    } else {
        None
    }
}

/// `"Bot not found"`-style bodies are used verbatim; anything else is generic.
pub fn not_found_default(body: &str) -> String {
    NOT_FOUND_PHRASE
        .captures(body.trim())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| RESOURCE_NOT_FOUND.to_string())
}
