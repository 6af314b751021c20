//! Session commands: login, register, logout, whoami, refresh-token.

use anyhow::{Context as _, Result, bail};
use clap::{Args, ValueEnum};
use colored::Colorize;

use vendorflow_core::{LoginCredentials, RegisterData, UserRole, validate_password};

use crate::output;
use crate::session::Context;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Account email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "VENDORFLOW_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoleArg {
    Admin,
    Vendor,
    Supplier,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => UserRole::Admin,
            RoleArg::Vendor => UserRole::Vendor,
            RoleArg::Supplier => UserRole::Supplier,
        }
    }
}

#[derive(Args, Debug)]
pub struct RegisterArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "VENDORFLOW_PASSWORD", hide_env_values = true)]
    pub password: String,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub company: String,

    #[arg(long, value_enum, default_value = "vendor")]
    pub role: RoleArg,

    /// Invitation code from an existing tenant
    #[arg(long)]
    pub invite_code: Option<String>,
}

pub async fn login(args: LoginArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let credentials = LoginCredentials::new(&args.email, &args.password);

    eprintln!("{}", "Logging in...".dimmed());
    let auth = client.login(&credentials).await.context("Failed to login")?;
    if auth.token().is_none() {
        output::otp_pending(&auth, "login");
        return Ok(());
    }

    output::success("Logged in successfully");
    output::signed_in(&auth, client.credentials().current().as_ref());
    Ok(())
}

pub async fn register(args: RegisterArgs, ctx: &Context) -> Result<()> {
    let validation = validate_password(&args.password);
    if !validation.is_valid {
        for problem in &validation.errors {
            output::error(problem);
        }
        bail!("Password does not meet the requirements");
    }

    let client = ctx.client()?;
    let data = RegisterData {
        email: args.email,
        password: args.password,
        first_name: args.first_name,
        last_name: args.last_name,
        company_name: args.company,
        role: args.role.into(),
        invite_code: args.invite_code,
    };

    eprintln!("{}", "Creating account...".dimmed());
    let auth = client
        .register(&data)
        .await
        .context("Failed to register")?;
    if auth.token().is_none() {
        output::otp_pending(&auth, "signup");
        return Ok(());
    }

    output::success("Account created");
    output::signed_in(&auth, client.credentials().current().as_ref());
    Ok(())
}

pub async fn logout(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    if let Err(e) = client.logout().await {
        tracing::warn!(error = %e, "Server rejected logout");
    }
    output::success("Logged out");
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    let credential = client
        .credentials()
        .current()
        .context("No active session. Run 'vendorflow login' first.")?;

    match client.current_user() {
        Some(user) => output::user(&user),
        None => output::field("User", "(profile not stored)"),
    }
    output::field("API", client.config().api_url.as_str());
    output::credential(&credential);
    if !client.is_authenticated() {
        eprintln!(
            "{}",
            "Token is expired or about to expire; it will be refreshed on the next request."
                .yellow()
        );
    }
    Ok(())
}

pub async fn refresh_token(ctx: &Context) -> Result<()> {
    let client = ctx.client()?;
    if client.credentials().current().is_none() {
        bail!("No active session. Run 'vendorflow login' first.");
    }

    eprintln!("{}", "Refreshing session...".dimmed());
    client
        .refresh_token()
        .await
        .context("Failed to refresh session")?;

    output::success("Session refreshed successfully");
    if let Some(credential) = client.credentials().current() {
        output::credential(&credential);
    }
    Ok(())
}
