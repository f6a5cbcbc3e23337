//! Turns a failed command into what the user sees.
//!
//! Every error leaving a handler passes through [`classify`] exactly once.
//! Known failures become a one-message [`Failure`]; anything else is a bug in
//! the client and gets the internal-error report from [`format_internal_error`].

use crate::api::ApiError;
use crate::config::Settings;
use crate::error::TurbotError;

pub const INTERNAL_ERROR_HEADLINE: &str = "Turbot client internal error.";
pub const BUG_REPORT_URL: &str = "https://github.com/openc/turbot-client/issues/new";

/// What the dispatcher should do with a failed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Credentials were rejected; the dispatcher may log in and retry.
    Unauthorized,
    /// Options did not parse. Help is shown before the message.
    BadOptions(String),
    /// A message the user can act on.
    Message(String),
    /// Not an expected failure.
    Internal,
}

pub fn classify(err: &TurbotError) -> Failure {
    match err {
        TurbotError::Api(ApiError::Unauthorized) => Failure::Unauthorized,
        TurbotError::OptionParse(message) => Failure::BadOptions(message.clone()),
        TurbotError::UnknownCommand {
            command,
            suggestion,
        } => Failure::Message(unknown_command_message(command, suggestion.as_deref())),
        TurbotError::Usage(message) | TurbotError::CommandFailed(message) => {
            Failure::Message(message.clone())
        }
        TurbotError::Api(ApiError::Decode(_)) => Failure::Internal,
        TurbotError::Api(api) => Failure::Message(api.user_message()),
        TurbotError::Registry(_)
        | TurbotError::Io(_)
        | TurbotError::Json(_)
        | TurbotError::Archive(_) => Failure::Internal,
    }
}

/// Three-line message for a command name nothing resolves to.
pub fn unknown_command_message(command: &str, suggestion: Option<&str>) -> String {
    let mut lines = vec![format!("`{}` is not a turbot command.", command)];
    if let Some(suggestion) = suggestion {
        lines.push(suggestion.to_string());
    }
    lines.push("See `turbot help` for a list of available commands.".to_string());
    lines.join("\n")
}

/// Short name for the kind of error, shown in the internal-error report.
pub fn error_kind(err: &TurbotError) -> &'static str {
    match err {
        TurbotError::Usage(_) => "Usage",
        TurbotError::UnknownCommand { .. } => "UnknownCommand",
        TurbotError::OptionParse(_) => "OptionParse",
        TurbotError::CommandFailed(_) => "CommandFailed",
        TurbotError::Api(ApiError::Unauthorized) => "Api::Unauthorized",
        TurbotError::Api(ApiError::NotFound { .. }) => "Api::NotFound",
        TurbotError::Api(ApiError::Timeout) => "Api::Timeout",
        TurbotError::Api(ApiError::RequestFailed { .. }) => "Api::RequestFailed",
        TurbotError::Api(ApiError::Connect(_)) => "Api::Connect",
        TurbotError::Api(ApiError::Decode(_)) => "Api::Decode",
        TurbotError::Registry(_) => "Registry",
        TurbotError::Io(_) => "Io",
        TurbotError::Json(_) => "Json",
        TurbotError::Archive(_) => "Archive",
    }
}

/// Bug-report text for an unexpected failure, written to stderr as is.
pub fn format_internal_error(err: &TurbotError, argv: &[String], settings: &Settings) -> String {
    let command = argv
        .iter()
        .map(|arg| {
            if arg.contains(' ') {
                format!("\"{}\"", arg)
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut lines = vec![
        format!(" !    {}", INTERNAL_ERROR_HEADLINE),
        format!(" !    Report a bug at: {}", BUG_REPORT_URL),
        String::new(),
        format!("    Error:       {} ({})", err, error_kind(err)),
        format!("    Command:     turbot {}", command),
    ];
    if !settings.is_default_host() {
        lines.push(format!("    Host:        {}", settings.host));
    }
    lines.push(format!("    Version:     {}", crate::user_agent()));
    lines.push("\n".to_string());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_unknown_command_lines() {
        assert_eq!(
            unknown_command_message("bot", Some("Perhaps you meant `bots`.")),
            "`bot` is not a turbot command.\nPerhaps you meant `bots`.\nSee `turbot help` for a list of available commands."
        );
        assert_eq!(
            unknown_command_message("zzz", None),
            "`zzz` is not a turbot command.\nSee `turbot help` for a list of available commands."
        );
    }

    #[test]
    fn test_api_failures_carry_upstream_message() {
        let err = TurbotError::Api(ApiError::RequestFailed {
            status: 402,
            body: r#"{"error":"Payment required"}"#.into(),
            content_type: Some("application/json".into()),
        });
        assert_eq!(classify(&err), Failure::Message("Payment required".into()));

        let err = TurbotError::Api(ApiError::NotFound {
            body: "Bot not found".into(),
            content_type: None,
        });
        assert_eq!(classify(&err), Failure::Message("Bot not found".into()));
    }

    #[test]
    fn test_classes() {
        assert_eq!(
            classify(&TurbotError::Api(ApiError::Unauthorized)),
            Failure::Unauthorized
        );
        assert_eq!(
            classify(&TurbotError::OptionParse("missing argument: --bot".into())),
            Failure::BadOptions("missing argument: --bot".into())
        );
        assert_eq!(
            classify(&TurbotError::Io(io::Error::other("disk"))),
            Failure::Internal
        );
        assert!(matches!(
            classify(&TurbotError::Api(ApiError::Timeout)),
            Failure::Message(m) if m.starts_with("API request timed out.")
        ));
    }

    #[test]
    fn test_internal_error_report() {
        let settings = Settings::for_host("http://localhost:5000", ".");
        let err = TurbotError::Io(io::Error::other("disk on fire"));
        let argv = vec!["bots:push".to_string(), "two words".to_string()];
        let report = format_internal_error(&err, &argv, &settings);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], " !    Turbot client internal error.");
        assert_eq!(
            lines[1],
            " !    Report a bug at: https://github.com/openc/turbot-client/issues/new"
        );
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "    Error:       disk on fire (Io)");
        assert_eq!(lines[4], "    Command:     turbot bots:push \"two words\"");
        assert_eq!(lines[5], "    Host:        http://localhost:5000");
        assert!(lines[6].starts_with("    Version:     turbot/"));
    }

    #[test]
    fn test_default_host_is_not_reported() {
        let mut settings = Settings::for_host(crate::config::DEFAULT_HOST, ".");
        settings.host = crate::config::DEFAULT_HOST.into();
        let err = TurbotError::Io(io::Error::other("x"));
        let report = format_internal_error(&err, &[], &settings);
        assert!(!report.contains("Host:"));
        assert!(report.contains("    Command:     turbot \n"));
    }
}
