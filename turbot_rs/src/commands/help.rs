use crate::cli::command::{CommandDescriptor, NamespaceDescriptor, Registry, RegistryError, help};
use crate::cli::dispatch::CommandContext;
use crate::error::Result;

const NAMESPACE: &str = "list commands and display help";

const INDEX: &str = "\
help [COMMAND]

list available commands or display help for a specific command

Examples:

 $ turbot help
 Usage: turbot COMMAND [--bot BOT] [command-specific-options]

 Primary help topics, type \"turbot help TOPIC\" for more details:

   auth  # Login or logout from Turbot
   bots  # manage bots (generate skeleton, validate data, submit code)

 $ turbot help bots:info
 Usage: turbot bots:info

 show detailed bot information";

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_namespace(NamespaceDescriptor::new("help", NAMESPACE));
    registry.register_command(CommandDescriptor::new("help", INDEX, index)?);
    registry.register_alias("-h", "help")?;
    registry.register_alias("--help", "help")?;
    Ok(())
}

fn index(ctx: &mut CommandContext<'_>) -> Result<()> {
    let registry = ctx.registry();
    match ctx.shift_argument() {
        Some(command) => help::render_command(registry, &command, ctx.console()),
        None => {
            help::render_root(registry, ctx.console());
            Ok(())
        }
    }
}
