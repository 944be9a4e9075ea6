//! SSH target address composition

use std::fmt;

/// An SSH destination, rendered as `user@host` or plain `host`.
///
/// Built from the positional server argument plus an optional username. A
/// username is only applied when the server argument does not already embed
/// one; a server given as `alice@db1` wins over any separate username.
///
/// # Examples
///
/// ```
/// use ssh2fa::TargetAddress;
///
/// assert_eq!(TargetAddress::compose("db1", Some("alice")).to_string(), "alice@db1");
/// assert_eq!(TargetAddress::compose("alice@db1", Some("bob")).to_string(), "alice@db1");
/// assert_eq!(TargetAddress::compose("db1", None).to_string(), "db1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAddress {
    user: Option<String>,
    host: String,
}

impl TargetAddress {
    /// Combine a server argument with an optional username argument.
    ///
    /// If `server` contains `@` it is split into user and host and `username`
    /// is ignored. Otherwise the whole string is the host and `username`, if
    /// given, becomes the user.
    pub fn compose(server: &str, username: Option<&str>) -> Self {
        match server.split_once('@') {
            Some((user, host)) => Self {
                user: Some(user.to_string()),
                host: host.to_string(),
            },
            None => Self {
                user: username.map(str::to_string),
                host: server.to_string(),
            },
        }
    }

    /// The host portion of the address.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The user portion, if any.
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }
}

impl fmt::Display for TargetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user {
            Some(user) => write!(f, "{}@{}", user, self.host),
            None => write!(f, "{}", self.host),
        }
    }
}
