//! Subcommand implementations.

pub mod api;
pub mod auth;
pub mod otp;
pub mod password;

use anyhow::Result;

use crate::cli::Commands;
use crate::session::Context;

pub async fn handle(command: Commands, ctx: &Context) -> Result<()> {
    match command {
        Commands::Login(args) => auth::login(args, ctx).await,
        Commands::Register(args) => auth::register(args, ctx).await,
        Commands::Logout => auth::logout(ctx).await,
        Commands::Whoami => auth::whoami(ctx),
        Commands::RefreshToken => auth::refresh_token(ctx).await,
        Commands::SendOtp(args) => otp::send(args, ctx).await,
        Commands::VerifyOtp(args) => otp::verify(args, ctx).await,
        Commands::Password(cmd) => password::handle(cmd, ctx).await,
        Commands::Api(args) => api::run(args, ctx).await,
    }
}
