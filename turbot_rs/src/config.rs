//! Configuration for the turbot client.
//!
//! Settings are resolved once at startup, in increasing precedence:
//! built-in defaults, the optional `~/.config/turbot/config.toml`, then the
//! `TURBOT_*` environment variables. Nothing reads the environment after
//! [`Settings`] has been built.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::colors::ColorMode;

/// Default API host when neither the config file nor `TURBOT_HOST` set one.
pub const DEFAULT_HOST: &str = "http://turbot.opencorporates.com";

/// Overrides the API host.
pub const HOST_ENV: &str = "TURBOT_HOST";
/// Supplies an API key non-interactively.
pub const API_KEY_ENV: &str = "TURBOT_API_KEY";
/// Overrides the bot a command operates on.
pub const BOT_ENV: &str = "TURBOT_BOT";
/// Overrides the credential file location.
pub const NETRC_ENV: &str = "TURBOT_NETRC";
/// `tracing` filter directive.
pub const LOG_ENV: &str = "TURBOT_LOG";

/// Optional `config.toml` contents.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// API host, same meaning as `TURBOT_HOST`.
    pub host: Option<String>,
    /// Color mode: auto, always or never.
    pub color: Option<String>,
}

impl ConfigFile {
    /// Load the config file from the user's config directory.
    /// Returns default config if the file doesn't exist or is invalid.
    pub fn load() -> Self {
        match dirs::config_dir() {
            Some(dir) => Self::load_from_path(&dir.join("turbot").join("config.toml")),
            None => Self::default(),
        }
    }

    /// Load config from a specific path.
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Everything a command needs to know about its environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API host as configured (scheme optional).
    pub host: String,
    /// Non-interactive API key from `TURBOT_API_KEY`.
    pub api_key: Option<String>,
    /// Bot id from `TURBOT_BOT`.
    pub bot: Option<String>,
    /// Credential file.
    pub netrc_path: PathBuf,
    pub color: ColorMode,
    /// Directory holding the bot's `manifest.json` (normally the cwd).
    pub working_dir: PathBuf,
}

impl Settings {
    /// Resolve settings from the real process environment.
    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::resolve(
            ConfigFile::load(),
            |key| std::env::var(key).ok(),
            dirs::home_dir(),
            cwd,
        )
    }

    /// Resolve settings from explicit inputs.
    pub fn resolve(
        config: ConfigFile,
        lookup: impl Fn(&str) -> Option<String>,
        home: Option<PathBuf>,
        working_dir: PathBuf,
    ) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = non_empty(HOST_ENV)
            .or(config.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let color = match config.color.as_deref().map(ColorMode::parse) {
            Some(Ok(mode)) => mode,
            Some(Err(e)) => {
                warn!("{}", e);
                ColorMode::Auto
            }
            None => ColorMode::Auto,
        };

        let netrc_path = non_empty(NETRC_ENV).map(PathBuf::from).unwrap_or_else(|| {
            home.unwrap_or_else(|| PathBuf::from("."))
                .join(default_netrc_name())
        });

        Self {
            host,
            api_key: non_empty(API_KEY_ENV),
            bot: non_empty(BOT_ENV),
            netrc_path,
            color,
            working_dir,
        }
    }

    /// Settings pointing at `host` with no ambient state, for tests and embedding.
    pub fn for_host(host: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        let working_dir = working_dir.into();
        Self {
            host: host.into(),
            api_key: None,
            bot: None,
            netrc_path: working_dir.join(".netrc"),
            color: ColorMode::Never,
            working_dir,
        }
    }

    /// True when credentials come from `TURBOT_API_KEY` rather than a prompt.
    pub fn api_key_from_env(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn is_default_host(&self) -> bool {
        self.host == DEFAULT_HOST
    }

    /// Base URL for API requests. Bare hostnames get `https://api.` prefixed.
    pub fn api_base_url(&self) -> String {
        let host = self.host.trim_end_matches('/');
        if host.starts_with("http") {
            host.to_string()
        } else {
            format!("https://api.{}", host)
        }
    }

    /// Machine name under which credentials are stored in the netrc file.
    pub fn netrc_machine(&self) -> String {
        let base = self.api_base_url();
        let hostname = reqwest::Url::parse(&base)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or(base);
        if hostname.starts_with("api.") {
            hostname
        } else {
            format!("api.{}", hostname)
        }
    }

    /// Second netrc machine kept in step with [`Self::netrc_machine`].
    pub fn code_netrc_machine(&self) -> String {
        let machine = self.netrc_machine();
        let hostname = machine.strip_prefix("api.").unwrap_or(&machine);
        format!("code.{}", hostname)
    }
}

fn default_netrc_name() -> &'static str {
    if cfg!(windows) { "_netrc" } else { ".netrc" }
}
