//! Credentials for one process invocation.
//!
//! Credentials come from `TURBOT_API_KEY` when set (never persisted) or from
//! the netrc store. They are read at most once and cached until a login or
//! logout changes them.

use tracing::debug;

use crate::config::Settings;
use crate::credentials::{CredentialStore, Credentials};
use crate::error::{Result, TurbotError};

/// Interactive logins allowed before an authentication failure is final.
pub const MAX_LOGIN_ATTEMPTS: u32 = 3;

#[derive(Debug)]
pub struct Session {
    store: CredentialStore,
    env_key: Option<String>,
    cached: Option<Option<Credentials>>,
    login_attempts: u32,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            store: CredentialStore::new(&settings.netrc_path, settings.netrc_machine())
                .mirrored_to(settings.code_netrc_machine()),
            env_key: settings.api_key.clone(),
            cached: None,
            login_attempts: 0,
        }
    }

    /// Whether the key came from the environment; such sessions never prompt.
    pub fn non_interactive(&self) -> bool {
        self.env_key.is_some()
    }

    /// Current credentials, if any. The email is empty for environment keys.
    pub fn credentials(&mut self) -> Result<Option<Credentials>> {
        if let Some(key) = &self.env_key {
            return Ok(Some(Credentials::new("", key.clone())));
        }
        if let Some(cached) = &self.cached {
            return Ok(cached.clone());
        }
        let loaded = self.store.load().map_err(|e| {
            TurbotError::failed(format!(
                "Unable to read {}: {}",
                self.store.path().display(),
                e
            ))
        })?;
        self.cached = Some(loaded.clone());
        Ok(loaded)
    }

    pub fn api_key(&mut self) -> Result<Option<String>> {
        Ok(self.credentials()?.map(|c| c.api_key))
    }

    /// Persist freshly obtained credentials.
    pub fn save(&mut self, credentials: Credentials) -> Result<()> {
        if self.non_interactive() {
            debug!("TURBOT_API_KEY is set; not writing credentials");
        } else {
            self.store.save(&credentials)?;
        }
        self.cached = Some(Some(credentials));
        Ok(())
    }

    /// Delete stored credentials.
    pub fn forget(&mut self) -> Result<()> {
        if !self.non_interactive() {
            self.store.delete()?;
        }
        self.cached = Some(None);
        Ok(())
    }

    /// Drop the in-memory copy so the next read goes back to the store.
    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// Count a login attempt; false once the allowance is used up.
    pub fn record_login_attempt(&mut self) -> bool {
        self.login_attempts += 1;
        self.login_attempts <= MAX_LOGIN_ATTEMPTS
    }

    pub fn login_attempts(&self) -> u32 {
        self.login_attempts
    }
}
