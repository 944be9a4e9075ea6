//! PTY-based session driving: spawn ssh, inject credentials, forward I/O

pub mod scanner;

use crate::error::Error;
use log::debug;
use portable_pty::{native_pty_system, CommandBuilder, PtySize};
use scanner::{Injection, PromptScanner};
use std::io::{Read, Write};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Fallback PTY rows when the real terminal size is unavailable.
const DEFAULT_PTY_ROWS: u16 = 24;

/// Fallback PTY columns.
const DEFAULT_PTY_COLS: u16 = 80;

/// Drives one interactive session: a child process on a pseudo-terminal
/// with automated credential injection at the login prompts.
///
/// While the session runs, everything the child prints is forwarded to the
/// real terminal and everything typed on the real terminal is forwarded to
/// the child, so after authentication the user has a normal interactive
/// shell. The session ends when the child exits.
///
/// # Examples
///
/// ```no_run
/// use ssh2fa::SessionDriver;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// SessionDriver::new("ssh alice@db1").run("hunter2", "123456").await?;
/// # Ok(())
/// # }
/// ```
pub struct SessionDriver {
    command: String,
    pty_size: PtySize,
}

impl SessionDriver {
    /// Create a driver for `command`, sized to the real terminal when its
    /// dimensions can be queried.
    pub fn new(command: &str) -> Self {
        let (cols, rows) =
            crossterm::terminal::size().unwrap_or((DEFAULT_PTY_COLS, DEFAULT_PTY_ROWS));
        Self {
            command: command.to_string(),
            pty_size: PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            },
        }
    }

    /// Run the session to completion.
    ///
    /// Injects `password` at the first `Password:` prompt and `totp_code` at
    /// the first `Verification code:` prompt, each followed by a newline and
    /// each at most once. The real terminal is switched into raw mode for
    /// the duration and restored on every exit path. Returns as soon as the
    /// child exits; the forwarding threads are left to die with the process.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pty`] or [`Error::Spawn`] if the session cannot be
    /// started, [`Error::Io`] if raw mode cannot be entered, and
    /// [`Error::ChildExit`] if the child terminates with a non-zero status.
    /// Mid-session stream errors on the forwarding tasks are not surfaced;
    /// the child's exit status is the authoritative result.
    pub async fn run(&self, password: &str, totp_code: &str) -> Result<(), Error> {
        let pty_system = native_pty_system();

        let pty_pair = pty_system
            .openpty(self.pty_size)
            .map_err(|e| Error::Pty(e.to_string()))?;

        let parts: Vec<&str> = self.command.split_whitespace().collect();
        if parts.is_empty() {
            return Err(Error::Spawn("empty command".to_string()));
        }
        let mut cmd = CommandBuilder::new(parts[0]);
        for arg in &parts[1..] {
            cmd.arg(arg);
        }

        let mut child = pty_pair
            .slave
            .spawn_command(cmd)
            .map_err(|e| Error::Spawn(e.to_string()))?;
        drop(pty_pair.slave);

        let reader = pty_pair
            .master
            .try_clone_reader()
            .map_err(|e| Error::Pty(e.to_string()))?;

        // take_writer() consumes the only writer; both the credential
        // injection and the keystroke forwarding go through this one handle
        // so the two writers never interleave mid-write.
        let writer = Arc::new(Mutex::new(
            pty_pair
                .master
                .take_writer()
                .map_err(|e| Error::Pty(e.to_string()))?,
        ));

        debug!("session started: {}", self.command);

        crossterm::terminal::enable_raw_mode()?;
        let _raw_guard = RawModeGuard;

        // The forwarders run on detached threads, not blocking tasks: the
        // stdin forwarder stays parked in read() after the child exits, and
        // runtime shutdown would wait for a blocking task. Detached threads
        // are simply abandoned when the process exits.
        let scanner = PromptScanner::new();
        let injection_writer = writer.clone();
        let password = password.to_string();
        let totp_code = totp_code.to_string();
        std::thread::spawn(move || {
            forward_output(reader, injection_writer, scanner, &password, &totp_code)
        });

        let input_writer = writer.clone();
        std::thread::spawn(move || forward_input(input_writer));

        let status = tokio::task::spawn_blocking(move || child.wait())
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))??;

        debug!("session ended: {status:?}");

        if status.success() {
            Ok(())
        } else {
            Err(Error::ChildExit {
                code: status.exit_code(),
            })
        }
    }
}

/// Read child output, mirror it to the real terminal, and inject credentials
/// when the scanner reports a prompt. Runs until the stream closes or errors.
fn forward_output(
    mut reader: Box<dyn Read + Send>,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    mut scanner: PromptScanner,
    password: &str,
    totp_code: &str,
) {
    let mut stdout = std::io::stdout();
    let mut buf = [0u8; 4096];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };

        // Forward first: the user sees the prompt before we answer it.
        if stdout
            .write_all(&buf[..n])
            .and_then(|_| stdout.flush())
            .is_err()
        {
            return;
        }

        if let Some(injection) = scanner.push(&buf[..n]) {
            let secret = match injection {
                Injection::Password => password,
                Injection::TotpCode => totp_code,
            };
            let mut w = writer.blocking_lock();
            if w.write_all(secret.as_bytes())
                .and_then(|_| w.write_all(b"\n"))
                .and_then(|_| w.flush())
                .is_err()
            {
                return;
            }
        }
    }
}

/// Forward raw keystrokes from the real terminal to the child. Runs until
/// stdin closes or the pty write fails.
fn forward_input(writer: Arc<Mutex<Box<dyn Write + Send>>>) {
    let mut stdin = std::io::stdin();
    let mut buf = [0u8; 4096];

    loop {
        let n = match stdin.read(&mut buf) {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };

        let mut w = writer.blocking_lock();
        if w.write_all(&buf[..n]).and_then(|_| w.flush()).is_err() {
            return;
        }
    }
}

/// RAII guard to restore terminal mode on drop.
struct RawModeGuard;

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}
