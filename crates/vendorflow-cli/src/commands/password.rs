//! Password commands.

use anyhow::{Context as _, Result};
use clap::Subcommand;

use vendorflow_core::{PasswordStrength, validate_password};

use crate::output;
use crate::session::Context;

#[derive(Subcommand, Debug)]
pub enum PasswordCommand {
    /// Email a password reset link
    Forgot {
        #[arg(long)]
        email: String,
    },

    /// Set a new password with a reset token
    Reset {
        #[arg(long)]
        token: String,

        #[arg(long)]
        new_password: String,
    },

    /// Change the signed-in user's password
    Change {
        #[arg(long)]
        current_password: String,

        #[arg(long)]
        new_password: String,
    },

    /// Check a password against the strength rules (offline)
    Check { password: String },
}

pub async fn handle(cmd: PasswordCommand, ctx: &Context) -> Result<()> {
    match cmd {
        PasswordCommand::Forgot { email } => {
            let reply = ctx
                .client()?
                .forgot_password(&email)
                .await
                .context("Failed to request password reset")?;
            output::success(&reply.message);
        }
        PasswordCommand::Reset {
            token,
            new_password,
        } => {
            let reply = ctx
                .client()?
                .reset_password(&token, &new_password)
                .await
                .context("Failed to reset password")?;
            output::success(&reply.message);
        }
        PasswordCommand::Change {
            current_password,
            new_password,
        } => {
            let reply = ctx
                .client()?
                .change_password(&current_password, &new_password)
                .await
                .context("Failed to change password")?;
            output::success(&reply.message);
        }
        PasswordCommand::Check { password } => check(&password),
    }
    Ok(())
}

fn check(password: &str) {
    let validation = validate_password(password);
    let strength = match validation.strength {
        PasswordStrength::Weak => "weak",
        PasswordStrength::Medium => "medium",
        PasswordStrength::Strong => "strong",
    };
    output::field("Strength", strength);
    for problem in &validation.errors {
        output::error(problem);
    }
}
