//! One-time password commands.

use anyhow::{Context as _, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;

use vendorflow_core::OtpPurpose;

use crate::output;
use crate::session::Context;

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PurposeArg {
    Signup,
    Login,
}

impl From<PurposeArg> for OtpPurpose {
    fn from(purpose: PurposeArg) -> Self {
        match purpose {
            PurposeArg::Signup => OtpPurpose::Signup,
            PurposeArg::Login => OtpPurpose::Login,
        }
    }
}

#[derive(Args, Debug)]
pub struct SendOtpArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, value_enum, default_value = "login")]
    pub purpose: PurposeArg,
}

#[derive(Args, Debug)]
pub struct VerifyOtpArgs {
    #[arg(long)]
    pub email: String,

    /// The code from the email
    #[arg(long)]
    pub otp: String,

    #[arg(long, value_enum, default_value = "login")]
    pub purpose: PurposeArg,
}

pub async fn send(args: SendOtpArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let sent = client
        .send_otp(&args.email, args.purpose.into())
        .await
        .context("Failed to send one-time password")?;

    output::success(&sent.message);
    if let Some(secs) = sent.expires_in {
        output::field("Valid for", &format!("{} seconds", secs));
    }
    Ok(())
}

pub async fn verify(args: VerifyOtpArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    eprintln!("{}", "Verifying code...".dimmed());
    let auth = client
        .verify_otp(&args.email, &args.otp, args.purpose.into())
        .await
        .context("Failed to verify one-time password")?;

    output::success("Verified");
    output::signed_in(&auth, client.credentials().current().as_ref());
    Ok(())
}
