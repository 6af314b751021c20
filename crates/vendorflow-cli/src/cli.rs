//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands::{api, auth, otp, password};

/// Command-line client for the VendorFlow API.
#[derive(Parser, Debug)]
#[command(name = "vendorflow")]
#[command(author, version = env!("VENDORFLOW_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// API base URL; `/api` is appended when missing
    #[arg(long, env = "VENDORFLOW_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Session file (defaults to the platform data directory)
    #[arg(long, env = "VENDORFLOW_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in with email and password
    Login(auth::LoginArgs),

    /// Create an account
    Register(auth::RegisterArgs),

    /// End the session
    Logout,

    /// Display the signed-in user
    Whoami,

    /// Refresh the access token
    RefreshToken,

    /// Request a one-time password by email
    SendOtp(otp::SendOtpArgs),

    /// Sign in with a one-time password
    VerifyOtp(otp::VerifyOtpArgs),

    /// Password reset and strength checks
    #[command(subcommand)]
    Password(password::PasswordCommand),

    /// Send a raw request to an API endpoint
    Api(api::ApiArgs),
}
