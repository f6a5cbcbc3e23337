//! What a command handler sees while it runs.

use std::collections::VecDeque;
use std::path::Path;

use tracing::debug;

use super::session::Session;
use crate::api::{ApiClient, ApiError};
use crate::cli::command::{Options, Registry, help};
use crate::config::Settings;
use crate::console::Console;
use crate::error::{Result, TurbotError};
use crate::manifest::Manifest;

pub const NO_BOT_SPECIFIED: &str = "No bot specified.\nRun this command from a bot folder containing a `manifest.json`, or specify which bot to use with --bot BOT_ID.";

/// Arguments, options and services for one command invocation.
pub struct CommandContext<'a> {
    command: String,
    args: VecDeque<String>,
    options: Options,
    registry: &'a Registry,
    settings: &'a Settings,
    console: &'a mut Console,
    session: &'a mut Session,
    api: Option<ApiClient>,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        command: impl Into<String>,
        args: Vec<String>,
        options: Options,
        registry: &'a Registry,
        settings: &'a Settings,
        console: &'a mut Console,
        session: &'a mut Session,
    ) -> Self {
        Self {
            command: command.into(),
            args: args.into(),
            options,
            registry,
            settings,
            console,
            session,
            api: None,
        }
    }

    /// The command name as typed (alias or canonical key).
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name)
    }

    pub fn flag(&self, name: &str) -> bool {
        self.options.flag(name)
    }

    pub fn registry(&self) -> &'a Registry {
        self.registry
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    pub fn console(&mut self) -> &mut Console {
        self.console
    }

    pub fn session(&mut self) -> &mut Session {
        self.session
    }

    pub fn working_dir(&self) -> &'a Path {
        &self.settings.working_dir
    }

    // === Positional arguments ===

    /// Next unconsumed positional argument.
    pub fn shift_argument(&mut self) -> Option<String> {
        self.args.pop_front()
    }

    pub fn remaining_arguments(&self) -> impl Iterator<Item = &String> {
        self.args.iter()
    }

    /// Fail when positionals remain that the handler never shifted.
    ///
    /// The command's help is printed first; the returned error names every
    /// leftover argument.
    pub fn validate_arguments(&mut self) -> Result<()> {
        let quoted: Vec<String> = self.args.iter().map(|a| format!("{:?}", a)).collect();
        let message = match quoted.split_last() {
            None => return Ok(()),
            Some((only, [])) => format!("Invalid argument: {}", only),
            Some((last, init)) => {
                format!("Invalid arguments: {} and {}", init.join(", "), last)
            }
        };
        if let Err(e) = help::render_command(self.registry, &self.command, self.console) {
            debug!(error = %e, "no help for command with invalid arguments");
        }
        Err(TurbotError::Usage(message))
    }

    // === Bot resolution ===

    /// Bot from `--bot`, then `TURBOT_BOT`, then `manifest.json`.
    pub fn bot_optional(&self) -> Option<String> {
        self.option("bot")
            .map(str::to_string)
            .or_else(|| self.settings.bot.clone())
            .or_else(|| Manifest::bot_id_in(&self.settings.working_dir))
    }

    pub fn bot(&self) -> Result<String> {
        self.bot_optional()
            .ok_or_else(|| TurbotError::failed(NO_BOT_SPECIFIED))
    }

    /// Manifest in the working directory.
    pub fn manifest(&self) -> Result<Manifest> {
        Manifest::load(&self.settings.working_dir)
    }

    // === API ===

    /// Authenticated API client. Without stored credentials this fails as
    /// unauthorized, which sends the dispatcher through login.
    pub fn api(&mut self) -> Result<&ApiClient> {
        if self.api.is_none() {
            let key = self
                .session
                .api_key()?
                .ok_or(TurbotError::Api(ApiError::Unauthorized))?;
            self.api = Some(ApiClient::new(self.settings.api_base_url(), Some(key))?);
        }
        self.api
            .as_ref()
            .ok_or(TurbotError::Api(ApiError::Unauthorized))
    }

    /// API client without credentials, for login and status checks.
    pub fn anonymous_api(&self) -> Result<ApiClient> {
        Ok(ApiClient::new(self.settings.api_base_url(), None)?)
    }
}
