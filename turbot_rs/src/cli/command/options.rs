//! Option declarations and parsed option values.

use std::collections::BTreeMap;
use std::fmt;

/// Validation hook run on an option's raw value before it is recorded.
pub type OptionHook = fn(&str) -> Result<(), String>;

/// One flag accepted by a command, or by every command.
#[derive(Clone)]
pub struct OptionSpec {
    /// Canonical key (`extra`, `ignore_no_bot`).
    pub name: String,
    /// Flag forms as declared, long forms first: `["--extra VAL", "-x"]`.
    pub arg_specs: Vec<String>,
    /// Text after `#` in the declaration.
    pub help: String,
    pub hook: Option<OptionHook>,
}

impl fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OptionSpec")
            .field("name", &self.name)
            .field("arg_specs", &self.arg_specs)
            .field("help", &self.help)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

// Hooks are not compared.
impl PartialEq for OptionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arg_specs == other.arg_specs && self.help == other.help
    }
}

impl Eq for OptionSpec {}

impl OptionSpec {
    /// Build a spec; `arg_specs` are reordered long-form first.
    pub fn new(name: impl Into<String>, arg_specs: &[&str]) -> Self {
        let mut arg_specs: Vec<String> = arg_specs.iter().map(|s| s.trim().to_string()).collect();
        arg_specs.sort_by_key(|spec| !spec.starts_with("--"));
        Self {
            name: name.into(),
            arg_specs,
            help: String::new(),
            hook: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = help.into();
        self
    }

    pub fn with_hook(mut self, hook: OptionHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Flag words without their value placeholder (`--extra`, `-x`).
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.arg_specs
            .iter()
            .filter_map(|spec| spec.split([' ', '=']).next())
    }

    /// True when any form declares a value placeholder.
    pub fn takes_value(&self) -> bool {
        self.arg_specs
            .iter()
            .any(|spec| spec.trim().contains([' ', '=']))
    }

    pub fn matches_long(&self, flag: &str) -> bool {
        flag.starts_with("--") && self.flags().any(|f| f == flag)
    }

    pub fn matches_short(&self, c: char) -> bool {
        let short = format!("-{}", c);
        self.flags().any(|f| !f.starts_with("--") && f == short)
    }

    /// The form shown in error messages (`--bot`).
    pub fn display_flag(&self) -> &str {
        self.flags().next().unwrap_or(self.name.as_str())
    }
}

/// Options every command accepts, matched before command-specific ones.
pub fn global_options() -> Vec<OptionSpec> {
    vec![
        OptionSpec::new("bot", &["-b", "--bot BOT"])
            .with_help("bot to run this command against")
            .with_hook(check_bot_value),
        OptionSpec::new("help", &["-h", "--help"]).with_help("show help for a command"),
    ]
}

fn check_bot_value(value: &str) -> Result<(), String> {
    if value.trim().is_empty() || value.starts_with('-') {
        Err(format!("invalid option: --bot {}", value))
    } else {
        Ok(())
    }
}

/// A recorded option value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionValue {
    Flag,
    Value(String),
}

/// Options recorded while parsing one invocation, by canonical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    values: BTreeMap<String, OptionValue>,
}

impl Options {
    pub fn insert(&mut self, name: impl Into<String>, value: OptionValue) {
        self.values.insert(name.into(), value);
    }

    /// String value of `name`; `None` for flags and absent options.
    pub fn get(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(OptionValue::Value(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Whether `name` was given at all.
    pub fn flag(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &OptionValue)> {
        self.values.iter()
    }
}
