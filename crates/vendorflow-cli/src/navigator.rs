//! Login prompt shown when the session is gone.

use colored::Colorize;

use vendorflow_core::{LoginRequired, Navigator};

/// Points the user at `vendorflow login`.
#[derive(Debug, Default)]
pub struct CliNavigator;

impl Navigator for CliNavigator {
    fn login_required(&self, reason: LoginRequired) {
        tracing::debug!(%reason, "Login required");
        let hint = match reason {
            LoginRequired::NoCredential => "No active session.",
            LoginRequired::RefreshFailed => "Session expired and could not be refreshed.",
        };
        eprintln!(
            "{} {}",
            hint.yellow(),
            "Run 'vendorflow login' to sign in.".dimmed()
        );
    }
}
