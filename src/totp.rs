//! External TOTP code generation

use crate::credentials::CredentialStore;
use crate::error::Error;
use log::debug;
use std::io::Write;
use std::process::{Command, Stdio};

/// Default generator command.
const DEFAULT_PROGRAM: &str = "totp-cli";

/// Driver for an external TOTP generator command.
///
/// The generator is invoked as `<program> generate <namespace> <identity>`,
/// receives the vault password on stdin, and is expected to print the code as
/// the last line of stdout. Its stderr goes straight to the controlling
/// terminal so tool diagnostics stay visible.
pub struct TotpGenerator {
    program: String,
}

impl Default for TotpGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl TotpGenerator {
    /// Use a specific generator binary instead of `totp-cli`.
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Generate a code for `identity` within `namespace`.
    ///
    /// The password comes from `store`, prompting the user if it is not
    /// cached yet.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TotpTool`] if the command cannot be started, its
    /// stdin cannot be written, or it exits with a non-zero status.
    pub fn generate(
        &self,
        store: &mut CredentialStore,
        namespace: &str,
        identity: &str,
    ) -> Result<String, Error> {
        let password = store.get_or_prompt()?;

        debug!("running {} generate {} {}", self.program, namespace, identity);

        let mut child = Command::new(&self.program)
            .arg("generate")
            .arg(namespace)
            .arg(identity)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| Error::TotpTool(format!("failed to start {}: {e}", self.program)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(password.as_bytes())
                .map_err(|e| Error::TotpTool(format!("failed to feed {}: {e}", self.program)))?;
            // Dropping the handle closes the pipe so the tool sees EOF.
        }

        let output = child
            .wait_with_output()
            .map_err(|e| Error::TotpTool(format!("failed to wait for {}: {e}", self.program)))?;

        if !output.status.success() {
            return Err(Error::TotpTool(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        Ok(extract_code(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Extract the code from generator output: trim the whole capture, then take
/// the last line. Empty output yields an empty string rather than an error.
pub fn extract_code(output: &str) -> String {
    output.trim().lines().last().unwrap_or("").to_string()
}
