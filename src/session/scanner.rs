//! One-shot prompt detection for the automation loop

use bytes::BytesMut;

/// Literal prompt the SSH client prints before password entry.
const PASSWORD_PROMPT: &[u8] = b"Password:";

/// Literal prompt printed for the second factor.
const TOTP_PROMPT: &[u8] = b"Verification code:";

/// Cap on accumulated output between matches.
const MAX_SCAN_BUFFER: usize = 8192;

/// Ratio for buffer compaction: discard oldest 1/3, keep newest 2/3.
const DISCARD_RATIO: usize = 3;

/// Where the automation currently is in the login sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptState {
    /// Waiting for the `Password:` prompt.
    AwaitingPassword,
    /// Password injected; waiting for the `Verification code:` prompt.
    AwaitingTotp,
    /// Both credentials injected; output is only forwarded.
    Transparent,
}

/// Which credential to inject after a prompt match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Injection {
    /// Send the SSH password.
    Password,
    /// Send the TOTP code.
    TotpCode,
}

/// Scans child output for the two login prompts, in order, each at most once.
///
/// The scanner is pure state: it never touches the pty, so the whole
/// automation policy is testable against scripted transcripts. Matching is
/// done on raw bytes, which keeps a prompt detectable even when a UTF-8
/// sequence elsewhere in the chunk is split across reads.
///
/// After a match the buffer is cleared, so each prompt is only looked for in
/// output accumulated since the previous match. A prompt reappearing later
/// (failed login) never fires again; the session just continues transparently.
pub struct PromptScanner {
    state: PromptState,
    buffer: BytesMut,
}

impl Default for PromptScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptScanner {
    /// Create a scanner in the initial `AwaitingPassword` state.
    pub fn new() -> Self {
        Self {
            state: PromptState::AwaitingPassword,
            buffer: BytesMut::with_capacity(MAX_SCAN_BUFFER),
        }
    }

    /// Current position in the login sequence.
    pub fn state(&self) -> PromptState {
        self.state
    }

    /// Feed a chunk of child output; returns the credential to inject, if
    /// this chunk completed a prompt.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Injection> {
        self.buffer.extend_from_slice(chunk);

        match self.state {
            PromptState::AwaitingPassword if contains(&self.buffer, PASSWORD_PROMPT) => {
                self.buffer.clear();
                self.state = PromptState::AwaitingTotp;
                Some(Injection::Password)
            }
            PromptState::AwaitingTotp if contains(&self.buffer, TOTP_PROMPT) => {
                self.buffer.clear();
                self.state = PromptState::Transparent;
                Some(Injection::TotpCode)
            }
            _ => {
                self.compact();
                None
            }
        }
    }

    /// Drop the oldest third of the buffer once it outgrows the cap. Only
    /// matters for long promptless stretches; the prompts themselves arrive
    /// within the first few hundred bytes of a login.
    fn compact(&mut self) {
        if self.buffer.len() > MAX_SCAN_BUFFER {
            let keep = MAX_SCAN_BUFFER - MAX_SCAN_BUFFER / DISCARD_RATIO;
            let discard = self.buffer.len() - keep;
            let _ = self.buffer.split_to(discard);
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_prompt_fires_injection() {
        let mut scanner = PromptScanner::new();
        assert_eq!(scanner.push(b"db1 login\nPassword: "), Some(Injection::Password));
        assert_eq!(scanner.state(), PromptState::AwaitingTotp);
    }

    #[test]
    fn prompt_split_across_reads() {
        let mut scanner = PromptScanner::new();
        assert_eq!(scanner.push(b"Pass"), None);
        assert_eq!(scanner.push(b"word:"), Some(Injection::Password));
    }

    #[test]
    fn password_injected_at_most_once() {
        let mut scanner = PromptScanner::new();
        assert_eq!(scanner.push(b"Password: "), Some(Injection::Password));
        // Server rejects and prompts again: one-shot policy, no re-injection.
        assert_eq!(scanner.push(b"Permission denied.\nPassword: "), None);
        assert_eq!(scanner.state(), PromptState::AwaitingTotp);
    }

    #[test]
    fn totp_waits_for_password_first() {
        let mut scanner = PromptScanner::new();
        // A verification prompt before any password prompt must not fire.
        assert_eq!(scanner.push(b"Verification code: "), None);
        assert_eq!(scanner.state(), PromptState::AwaitingPassword);

        assert_eq!(scanner.push(b"Password: "), Some(Injection::Password));
        // Buffer was cleared on the match; the earlier verification text is
        // gone and a fresh prompt is required.
        assert_eq!(scanner.push(b"Verification code: "), Some(Injection::TotpCode));
        assert_eq!(scanner.state(), PromptState::Transparent);
    }

    #[test]
    fn buffer_cleared_on_match() {
        let mut scanner = PromptScanner::new();
        assert_eq!(
            scanner.push(b"Password: Verification"),
            Some(Injection::Password)
        );
        // The tail of that chunk was discarded with the buffer, so the
        // verification prompt must arrive whole to match.
        assert_eq!(scanner.push(b" code:"), None);
        assert_eq!(scanner.push(b"Verification code:"), Some(Injection::TotpCode));
    }

    #[test]
    fn full_login_transcript() {
        let mut scanner = PromptScanner::new();
        assert_eq!(scanner.push(b"(alice@db1) Password: "), Some(Injection::Password));
        assert_eq!(scanner.push(b"\r\n"), None);
        assert_eq!(
            scanner.push(b"(alice@db1) Verification code: "),
            Some(Injection::TotpCode)
        );
        // Fully transparent from here on, whatever the output contains.
        assert_eq!(scanner.push(b"Password: Verification code: "), None);
        assert_eq!(scanner.state(), PromptState::Transparent);
    }

    #[test]
    fn transparent_buffer_stays_bounded() {
        let mut scanner = PromptScanner::new();
        scanner.push(b"Password: ");
        scanner.push(b"Verification code: ");
        for _ in 0..100 {
            scanner.push(&[b'x'; 1024]);
        }
        assert!(scanner.buffer.len() <= MAX_SCAN_BUFFER);
    }

    #[test]
    fn promptless_output_stays_bounded_while_waiting() {
        let mut scanner = PromptScanner::new();
        for _ in 0..100 {
            assert_eq!(scanner.push(&[b'x'; 1024]), None);
        }
        assert!(scanner.buffer.len() <= MAX_SCAN_BUFFER);
        // Still able to match once the prompt finally shows up.
        assert_eq!(scanner.push(b"Password: "), Some(Injection::Password));
    }
}
