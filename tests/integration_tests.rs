//! Integration tests for ssh2fa

use ssh2fa::{
    extract_code, CredentialStore, Injection, PromptScanner, PromptState, SessionDriver,
    TargetAddress,
};
use std::time::{Duration, Instant};

#[test]
fn test_bare_server_without_username() {
    let target = TargetAddress::compose("db1", None);
    assert_eq!(target.to_string(), "db1");
}

#[test]
fn test_bare_server_with_username() {
    let target = TargetAddress::compose("db1", Some("alice"));
    assert_eq!(target.to_string(), "alice@db1");
}

#[test]
fn test_embedded_username_ignores_argument() {
    let target = TargetAddress::compose("alice@db1", Some("bob"));
    assert_eq!(target.to_string(), "alice@db1");
}

#[test]
fn test_generator_output_last_line_wins() {
    assert_eq!(extract_code("junk line\n123456\n"), "123456");
}

#[test]
fn test_generator_empty_output_is_empty_code() {
    assert_eq!(extract_code(""), "");
}

#[test]
fn test_credential_store_prompts_at_most_once() {
    let mut store = CredentialStore::with_secret("s3cret");
    for _ in 0..10 {
        assert_eq!(store.get_or_prompt().unwrap(), "s3cret");
    }
}

// Transcript of a real two-factor login as the scanner sees it: banner,
// password prompt, rejection-free TOTP prompt, then a shell.
#[test]
fn test_login_transcript_drives_both_injections() {
    let mut scanner = PromptScanner::new();

    assert_eq!(scanner.push(b"Welcome to db1\r\n"), None);
    assert_eq!(
        scanner.push(b"(alice@db1) Password: "),
        Some(Injection::Password)
    );
    assert_eq!(scanner.push(b"\r\n(alice@db1) Verification "), None);
    assert_eq!(scanner.push(b"code: "), Some(Injection::TotpCode));
    assert_eq!(scanner.push(b"\r\nalice@db1:~$ "), None);
    assert_eq!(scanner.state(), PromptState::Transparent);
}

// The session must hand control back as soon as the child exits, even
// though the stdin forwarder is still parked in a blocking read. Dropping
// the runtime here is the part that used to hang until the next keypress.
#[test]
fn test_control_returns_when_child_exits() {
    let command = if cfg!(windows) { "cmd /C exit 0" } else { "true" };

    let start = Instant::now();
    let rt = tokio::runtime::Runtime::new().expect("Failed to build runtime");
    // Without a controlling terminal run() errors out early; either way it
    // must not block on the forwarders once the child is gone.
    let _ = rt.block_on(SessionDriver::new(command).run("pw", "code"));
    drop(rt);

    assert!(
        start.elapsed() < Duration::from_secs(10),
        "session did not return promptly after child exit"
    );
}

// A server rejecting the first password re-prompts; the one-shot policy
// means no second injection ever happens.
#[test]
fn test_repeated_password_prompt_injects_once() {
    let mut scanner = PromptScanner::new();

    let mut injections = 0;
    for chunk in [
        b"Password: ".as_slice(),
        b"\r\nPermission denied, please try again.\r\n".as_slice(),
        b"Password: ".as_slice(),
    ] {
        if scanner.push(chunk) == Some(Injection::Password) {
            injections += 1;
        }
    }
    assert_eq!(injections, 1);
}
