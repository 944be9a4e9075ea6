//! ssh2fa: SSH login automation for password + TOTP prompts
//!
//! ssh2fa spawns an SSH client under a pseudo-terminal, watches its output
//! for the password and verification-code prompts, injects each credential
//! exactly once, and then hands the session over to the user as a normal
//! interactive terminal.
//!
//! The TOTP code itself comes from an external generator (`totp-cli`); this
//! crate only drives it and feeds it the cached password.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use ssh2fa::{CredentialStore, SessionDriver, TargetAddress, TotpGenerator};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let target = TargetAddress::compose("db1", Some("alice"));
//!
//! let mut store = CredentialStore::from_env("Password");
//! let password = store.get_or_prompt()?;
//! let code = TotpGenerator::default().generate(&mut store, "prod", &target.to_string())?;
//!
//! SessionDriver::new(&format!("ssh {target}")).run(&password, &code).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod credentials;
mod error;
mod session;
mod target;
mod totp;

// Public API exports
pub use credentials::{CredentialStore, PASSWORD_ENV};
pub use error::Error;
pub use session::scanner::{Injection, PromptScanner, PromptState};
pub use session::SessionDriver;
pub use target::TargetAddress;
pub use totp::{extract_code, TotpGenerator};
