//! Error types for ssh2fa

use thiserror::Error;

/// Errors that can occur while automating an SSH login.
///
/// Usage errors (wrong argument count) never reach this enum; they are
/// handled at the CLI boundary with a usage message and exit code 1.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error.
    ///
    /// Returned when the controlling terminal cannot be switched into or out
    /// of the required mode, when the password prompt fails, or when an
    /// underlying read/write fails outside the forwarding tasks (those
    /// swallow their own stream errors and simply end).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external TOTP generator failed.
    ///
    /// Returned when the generator command cannot be started, its stdin
    /// cannot be fed, or it exits with a non-zero status.
    #[error("TOTP generator failed: {0}")]
    TotpTool(String),

    /// Pseudo-terminal allocation failed.
    #[error("PTY error: {0}")]
    Pty(String),

    /// The SSH client could not be spawned.
    #[error("Failed to spawn process: {0}")]
    Spawn(String),

    /// The SSH client exited with a non-zero status.
    ///
    /// The child's own exit status is the authoritative result of a session;
    /// the exit code is propagated as the program's exit code.
    #[error("ssh exited with status {code}")]
    ChildExit {
        /// The child process's exit code.
        code: u32,
    },
}
