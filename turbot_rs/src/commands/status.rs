//! `status`: platform health from `current-status.json`.

use chrono::Utc;
use serde_json::Value;

use super::format::{plain_value, time_ago};
use crate::cli::command::{CommandDescriptor, NamespaceDescriptor, Registry, RegistryError};
use crate::cli::dispatch::CommandContext;
use crate::console::Console;
use crate::error::Result;

const NAMESPACE: &str = "check status of turbot platform";

const INDEX: &str = "\
status

display current status of turbot platform

Example:

 $ turbot status
 === Turbot Status
 Development: No known issues at this time.
 Production:  No known issues at this time.";

const ALL_CLEAR: &str = "No known issues at this time.";

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_namespace(NamespaceDescriptor::new("status", NAMESPACE));
    registry.register_command(CommandDescriptor::new("status", INDEX, index)?);
    Ok(())
}

fn index(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let status = ctx.anonymous_api()?.current_status()?;
    render(ctx.console(), &status);
    Ok(())
}

/// Print a status document.
pub fn render(console: &mut Console, status: &Value) {
    console.styled_header("Turbot Status");

    let entries: Vec<(String, String)> = status
        .get("status")
        .and_then(Value::as_object)
        .map(|systems| {
            systems
                .iter()
                .map(|(system, state)| {
                    let state = match state.as_str() {
                        Some("green") => ALL_CLEAR.to_string(),
                        _ => plain_value(state),
                    };
                    (system.clone(), state)
                })
                .collect()
        })
        .unwrap_or_default();
    console.styled_hash(&entries);

    let issues = status
        .get("issues")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    if issues.is_empty() {
        return;
    }

    let now = Utc::now();
    let text = |value: &Value, key: &str| value.get(key).map(plain_value).unwrap_or_default();
    console.blank_line();
    for issue in issues {
        let duration = time_ago(&text(issue, "created_at"), now).replace(" ago", "+");
        console.styled_header(&format!("{}  {}", text(issue, "title"), duration));
        let changes: Vec<Vec<String>> = issue
            .get("updates")
            .and_then(Value::as_array)
            .map(|updates| {
                updates
                    .iter()
                    .map(|update| {
                        vec![
                            time_ago(&text(update, "created_at"), now),
                            text(update, "update_type"),
                            text(update, "contents"),
                        ]
                    })
                    .collect()
            })
            .unwrap_or_default();
        console.styled_rows(&changes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_all_green() {
        let mut console = Console::memory::<&str>(&[]);
        render(
            &mut console,
            &json!({"status": {"Production": "green", "Development": "green"}, "issues": []}),
        );
        assert_eq!(
            console.stdout_text(),
            "=== Turbot Status\nDevelopment: No known issues at this time.\nProduction:  No known issues at this time.\n"
        );
    }

    #[test]
    fn test_issues_are_listed() {
        let mut console = Console::memory::<&str>(&[]);
        render(
            &mut console,
            &json!({
                "status": {"Production": "red"},
                "issues": [{
                    "title": "API outage",
                    "created_at": "2020-01-01T00:00:00Z",
                    "updates": [
                        {"created_at": "2020-01-01T01:00:00Z", "update_type": "update", "contents": "fixing"},
                        {"created_at": "2020-01-01T00:00:00Z", "update_type": "issue", "contents": "down"}
                    ]
                }]
            }),
        );
        assert_eq!(
            console.stdout_text(),
            "=== Turbot Status\nProduction: red\n\n=== API outage  2020/01/01 00:00:00\n2020/01/01 01:00:00  update  fixing\n2020/01/01 00:00:00  issue   down\n\n"
        );
    }
}
