//! `auth` namespace: login, logout and credential display.

use crate::cli::command::{CommandDescriptor, NamespaceDescriptor, Registry, RegistryError, help};
use crate::cli::dispatch::CommandContext;
use crate::credentials::Credentials;
use crate::error::{Result, TurbotError};

const NAMESPACE: &str = "Login or logout from Turbot";

const INDEX: &str = "\
auth

Login or logout. Display your Turbot API token or email address.";

const LOGIN: &str = "\
auth:login

Login to Turbot and save your Turbot credentials.

Example:

  $ turbot auth:login
  Enter your Turbot email and password.
  Email: email@example.com
  Password (typing will be hidden):
  Authentication successful.";

const LOGOUT: &str = "\
auth:logout

Delete your Turbot credentials.

Example:

  $ turbot auth:logout
  Deleted Turbot credentials.";

const TOKEN: &str = "\
auth:token

Display your Turbot API token.

Example:

  $ turbot auth:token
  93a5c45595ed37dc9d040116";

const WHOAMI: &str = "\
auth:whoami

Display your Turbot email address.

Example:

  $ turbot auth:whoami
  email@example.com";

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register_namespace(NamespaceDescriptor::new("auth", NAMESPACE));
    registry.register_command(CommandDescriptor::new("auth", INDEX, index)?);
    registry.register_command(CommandDescriptor::new("auth:login", LOGIN, login)?);
    registry.register_command(CommandDescriptor::new("auth:logout", LOGOUT, logout)?);
    registry.register_command(CommandDescriptor::new("auth:token", TOKEN, token)?);
    registry.register_command(CommandDescriptor::new("auth:whoami", WHOAMI, whoami)?);
    registry.register_alias("login", "auth:login")?;
    registry.register_alias("logout", "auth:logout")?;
    Ok(())
}

fn index(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let registry = ctx.registry();
    let command = ctx.command().to_string();
    help::render_command(registry, &command, ctx.console())
}

fn login(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let console = ctx.console();
    console.display("Enter your Turbot email and password.");
    console.display_inline("Email: ");
    let email = console.ask()?;
    console.display_inline("Password (typing will be hidden): ");
    let password = console.ask_secret()?;
    console.blank_line();

    let api_key = ctx
        .anonymous_api()?
        .get_api_key_for_credentials(&email, &password)?;
    if api_key.is_empty() {
        return Err(TurbotError::failed("Authentication failed."));
    }
    ctx.session().save(Credentials::new(email, api_key))?;
    ctx.console().display("Authentication successful.");
    Ok(())
}

fn logout(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    ctx.session().forget()?;
    ctx.console().display("Deleted Turbot credentials.");
    Ok(())
}

fn token(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let credentials = ctx
        .session()
        .credentials()?
        .ok_or_else(|| TurbotError::failed("not logged in"))?;
    ctx.console().display(&credentials.api_key);
    Ok(())
}

fn whoami(ctx: &mut CommandContext<'_>) -> Result<()> {
    ctx.validate_arguments()?;
    let credentials = ctx
        .session()
        .credentials()?
        .ok_or_else(|| TurbotError::failed("not logged in"))?;
    ctx.console().display(&credentials.email);
    Ok(())
}
