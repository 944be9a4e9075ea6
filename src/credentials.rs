//! Credential storage and interactive prompting

use crate::error::Error;
use dialoguer::Password;
use std::env;

/// Environment variable consulted for a pre-set password.
pub const PASSWORD_ENV: &str = "TOTP_PASS";

/// A single-slot credential store: prompt at most once per process run.
///
/// The store is seeded from [`PASSWORD_ENV`] at construction. The first call
/// to [`get_or_prompt`](CredentialStore::get_or_prompt) with an empty slot
/// asks on the controlling terminal with echo suppressed and caches the
/// answer; every later call returns the cached value with no I/O.
pub struct CredentialStore {
    secret: Option<String>,
    prompt: String,
}

impl CredentialStore {
    /// Create a store seeded from the environment.
    ///
    /// `prompt` is the label shown if an interactive prompt is needed.
    pub fn from_env(prompt: &str) -> Self {
        Self {
            secret: env::var(PASSWORD_ENV).ok(),
            prompt: prompt.to_string(),
        }
    }

    /// Create a store with the secret already in place. No prompt will ever
    /// be shown.
    pub fn with_secret(secret: &str) -> Self {
        Self {
            secret: Some(secret.to_string()),
            prompt: String::new(),
        }
    }

    /// Whether the slot is populated.
    pub fn is_cached(&self) -> bool {
        self.secret.is_some()
    }

    /// Return the cached secret, prompting interactively on first use.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the terminal cannot be put into no-echo mode
    /// or the read fails.
    pub fn get_or_prompt(&mut self) -> Result<String, Error> {
        if let Some(secret) = &self.secret {
            return Ok(secret.clone());
        }

        let secret = Password::new()
            .with_prompt(&self.prompt)
            .interact()
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;

        self.secret = Some(secret.clone());
        Ok(secret)
    }
}
