//! Dispatcher: from `(command, args)` to a handler call and an exit code.
//!
//! [`Dispatcher::prepare_run`] resolves the command and parses its options
//! without running anything; [`Dispatcher::run`] invokes the handler and
//! classifies whatever it returns. Errors are printed in exactly one place,
//! at the bottom of `run`.

mod classify;
mod context;
mod session;

pub use classify::{
    BUG_REPORT_URL, Failure, classify, error_kind, format_internal_error, unknown_command_message,
};
pub use context::{CommandContext, NO_BOT_SPECIFIED};
pub use session::{MAX_LOGIN_ATTEMPTS, Session};

use tracing::debug;

use crate::cli::command::{CommandDescriptor, OptionSpec, Options, Registry, global_options};
use crate::cli::parser::{parse_arguments, suggest};
use crate::config::Settings;
use crate::console::Console;
use crate::error::{Result, TurbotError};

/// A resolved command with its parsed arguments, ready to invoke.
#[derive(Debug)]
pub struct Prepared<'a> {
    pub descriptor: &'a CommandDescriptor,
    /// Name the command is run under after help/version rewriting.
    pub command: String,
    pub args: Vec<String>,
    pub options: Options,
}

pub struct Dispatcher<'a> {
    registry: &'a Registry,
    settings: &'a Settings,
    console: &'a mut Console,
    session: Session,
}

impl<'a> Dispatcher<'a> {
    pub fn new(registry: &'a Registry, settings: &'a Settings, console: &'a mut Console) -> Self {
        Self {
            registry,
            settings,
            console,
            session: Session::new(settings),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Resolve `name`, rewrite help requests and parse `args`.
    ///
    /// `-h`/`--help` anywhere in `args` turns the call into `help <name>`.
    /// Positionals and unrecognised flags end up in [`Prepared::args`].
    pub fn prepare_run(&self, name: &str, args: &[String]) -> Result<Prepared<'a>> {
        let registry: &'a Registry = self.registry;
        let mut name = name.to_string();
        let mut args = args.to_vec();

        if args.iter().any(|a| a == "-h" || a == "--help") {
            if !name.starts_with('-') {
                args.insert(0, name.clone());
            }
            name = "help".to_string();
        }
        if name == "--version" {
            name = "version".to_string();
        }

        let descriptor = registry.resolve(&name);
        let specs = effective_options(descriptor);
        let parsed = parse_arguments(&specs, &args)?;

        let Some(descriptor) = descriptor else {
            let keys = registry.keys();
            return Err(TurbotError::UnknownCommand {
                suggestion: suggest(&name, keys.as_slice()),
                command: name,
            });
        };
        debug!(
            command = %name,
            resolved = %descriptor.command,
            args = ?parsed.leftovers,
            "prepared command"
        );
        Ok(Prepared {
            descriptor,
            command: name,
            args: parsed.leftovers,
            options: parsed.options,
        })
    }

    /// Call the prepared command's handler.
    pub fn invoke(&mut self, prepared: Prepared<'_>) -> Result<()> {
        let handler = prepared.descriptor.handler;
        let mut context = CommandContext::new(
            prepared.command,
            prepared.args,
            prepared.options,
            self.registry,
            self.settings,
            &mut *self.console,
            &mut self.session,
        );
        handler(&mut context)
    }

    fn run_once(&mut self, name: &str, args: &[String]) -> Result<()> {
        let prepared = self.prepare_run(name, args)?;
        self.invoke(prepared)
    }

    /// Run a command to completion and return the process exit code.
    ///
    /// Rejected credentials trigger `login` and a retry of the whole command,
    /// up to [`MAX_LOGIN_ATTEMPTS`] times. With `TURBOT_API_KEY` set there is
    /// nobody to prompt, so the first rejection is final.
    pub fn run(&mut self, name: &str, args: &[String]) -> i32 {
        loop {
            let err = match self.run_once(name, args) {
                Ok(()) => return 0,
                Err(err) => err,
            };
            debug!(command = %name, error = %err, "command failed");

            match classify(&err) {
                Failure::Unauthorized => {
                    self.console.display("Authentication failure");
                    if self.session.non_interactive() || !self.session.record_login_attempt() {
                        return 1;
                    }
                    self.session.invalidate();
                    let code = self.run("login", &[]);
                    if code != 0 {
                        return code;
                    }
                }
                Failure::BadOptions(message) => {
                    let topic: Vec<String> = match self.registry.resolve(name) {
                        Some(_) => vec![name.to_string()],
                        None => Vec::new(),
                    };
                    self.run("help", &topic);
                    self.console.error(&message);
                    return 1;
                }
                Failure::Message(message) => {
                    self.console.error(&message);
                    return 1;
                }
                Failure::Internal => {
                    let argv: Vec<String> = std::iter::once(name.to_string())
                        .chain(args.iter().cloned())
                        .collect();
                    let report = format_internal_error(&err, &argv, self.settings);
                    self.console.error_raw(&report);
                    return 1;
                }
            }
        }
    }
}

/// Global options followed by the command's own.
fn effective_options(descriptor: Option<&CommandDescriptor>) -> Vec<OptionSpec> {
    let mut specs = global_options();
    if let Some(descriptor) = descriptor {
        specs.extend(descriptor.options.iter().cloned());
    }
    specs
}
