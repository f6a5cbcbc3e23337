use crate::cli::command::{CommandDescriptor, NamespaceDescriptor, Registry, RegistryError};
use crate::cli::dispatch::CommandContext;
use crate::error::Result;

const NAMESPACE: &str = "Display version";

const INDEX: &str = "\
version

Show the Turbot client's version.

Example:

  $ turbot version
  turbot/0.3.0 (x86_64-linux)";

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_namespace(NamespaceDescriptor::new("version", NAMESPACE));
    registry.register_command(CommandDescriptor::new("version", INDEX, index)?);
    registry.register_alias("--version", "version")?;
    Ok(())
}

fn index(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    ctx.console().display(&crate::user_agent());
    Ok(())
}
