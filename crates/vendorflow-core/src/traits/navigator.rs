//! Hook invoked when the user must sign in again.

use std::fmt;

/// Why the client is sending the user to the login entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRequired {
    /// No credential in memory or storage.
    NoCredential,
    /// The refresh endpoint rejected or failed; credentials were cleared.
    RefreshFailed,
}

impl fmt::Display for LoginRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoginRequired::NoCredential => f.write_str("no active session"),
            LoginRequired::RefreshFailed => f.write_str("session expired"),
        }
    }
}

/// Sends the user to the login entry point.
///
/// Called synchronously, before the failing call returns, so every waiter
/// observes the redirect before its result.
pub trait Navigator: Send + Sync {
    fn login_required(&self, reason: LoginRequired);
}

/// Navigator that only records the event in the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn login_required(&self, reason: LoginRequired) {
        tracing::warn!(%reason, "Login required");
    }
}
