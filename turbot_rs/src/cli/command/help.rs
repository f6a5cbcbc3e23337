//! Help output for `turbot help` and `turbot help COMMAND`.

use super::registry::Registry;
use super::types::{CommandDescriptor, NamespaceDescriptor};
use crate::console::Console;
use crate::error::{Result, TurbotError};

/// Namespaces listed under "Primary help topics".
pub const PRIMARY_NAMESPACES: &[&str] = &["auth", "bots"];

pub const ROOT_USAGE: &str = "Usage: turbot COMMAND [--bot BOT] [command-specific-options]";

fn skip_namespace(namespace: &NamespaceDescriptor) -> bool {
    namespace.description.contains("DEPRECATED:") || namespace.description.contains("HIDDEN:")
}

fn skip_command(command: &CommandDescriptor) -> bool {
    command.help.contains("DEPRECATED:") || command.help.lines().any(|l| l.starts_with("HIDDEN:"))
}

fn longest<'a>(items: impl Iterator<Item = &'a str>) -> usize {
    items.map(str::len).max().unwrap_or(0)
}

fn summary_for_namespaces(console: &mut Console, namespaces: &[&NamespaceDescriptor]) {
    let width = longest(namespaces.iter().map(|n| n.name.as_str()));
    let mut sorted = namespaces.to_vec();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    for namespace in sorted {
        if skip_namespace(namespace) {
            continue;
        }
        console.display(&format!(
            "  {:<width$}  # {}",
            namespace.name,
            namespace.description,
            width = width
        ));
    }
}

/// `turbot help` with no argument.
pub fn render_root(registry: &Registry, console: &mut Console) {
    let (primary, additional): (Vec<&NamespaceDescriptor>, Vec<&NamespaceDescriptor>) = registry
        .namespaces()
        .partition(|n| PRIMARY_NAMESPACES.contains(&n.name.as_str()));

    console.display(ROOT_USAGE);
    console.blank_line();
    console.display("Primary help topics, type \"turbot help TOPIC\" for more details:");
    console.blank_line();
    summary_for_namespaces(console, &primary);
    console.blank_line();
    console.display("Additional topics:");
    console.blank_line();
    summary_for_namespaces(console, &additional);
    console.blank_line();
}

fn render_namespace(console: &mut Console, commands: &[&CommandDescriptor]) {
    let width = longest(commands.iter().map(|c| c.banner.as_str()));
    let mut sorted = commands.to_vec();
    sorted.sort_by(|a, b| a.banner.cmp(&b.banner));
    for command in sorted {
        if skip_command(command) {
            continue;
        }
        console.display(&format!(
            "  {:<width$}  # {}",
            command.banner,
            command.summary,
            width = width
        ));
    }
}

/// `turbot help NAME`: usage and body of the command, then the other
/// commands in the namespace called `NAME`.
pub fn render_command(registry: &Registry, name: &str, console: &mut Console) -> Result<()> {
    let mut name = name;
    if let Some(target) = registry.alias_target(name) {
        console.display(&format!("Alias: {} redirects to {}", name, target));
        name = target;
    }

    let command = registry.get(name);
    if let Some(command) = command {
        console.display(&format!("Usage: turbot {}", command.banner));
        let body: Vec<&str> = command
            .help
            .lines()
            .filter(|line| !line.contains("HIDDEN"))
            .skip(1)
            .collect();
        console.display(&body.join("\n"));
        console.blank_line();
    }

    let others: Vec<&CommandDescriptor> = registry
        .commands_in_namespace(name)
        .into_iter()
        .filter(|c| !c.help.contains("DEPRECATED"))
        .collect();

    if !others.is_empty() {
        console.display("Additional commands, type \"turbot help COMMAND\" for more details:");
        console.blank_line();
        render_namespace(console, &others);
        console.blank_line();
    } else if command.is_none() {
        return Err(TurbotError::failed(format!(
            "{} is not a turbot command. See `turbot help`.",
            name
        )));
    }
    Ok(())
}
