//! Output formatting helpers.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use vendorflow_core::{AuthResponse, User};
use vendorflow_http::{Credential, ResponseBody};

/// Print a success message.
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message.
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a labeled field.
pub fn field(label: &str, value: &str) {
    println!("{}: {}", label.dimmed(), value);
}

/// Print a value as pretty-printed JSON.
pub fn json_pretty<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print a response body: JSON pretty-printed, text verbatim.
pub fn body(body: &ResponseBody) -> Result<()> {
    match body {
        ResponseBody::Json(value) => json_pretty(value),
        ResponseBody::Text(text) => {
            print!("{}", text);
            if !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

pub fn user(user: &User) {
    field("User", &user.display_name());
    field("Email", &user.email);
    field("Role", user.role.as_str());
    if let Some(ref company) = user.company_name {
        field("Company", company);
    }
    field("Dashboard", user.role.dashboard_path());
}

pub fn credential(credential: &Credential) {
    if let Some(expires_at) = credential.expires_at() {
        let local = expires_at.with_timezone(&chrono::Local);
        field("Expires", &local.format("%Y-%m-%d %H:%M:%S").to_string());
    }
}

/// Summary printed after any successful sign-in.
pub fn signed_in(auth: &AuthResponse, credential: Option<&Credential>) {
    println!();
    if let Some(user) = auth.profile() {
        self::user(user);
    }
    if let Some(credential) = credential {
        self::credential(credential);
    }
}

/// Printed when sign-in stops at the one-time password step.
pub fn otp_pending(auth: &AuthResponse, purpose: &str) {
    success(auth.message.as_deref().unwrap_or("One-time password sent"));
    if let Some(secs) = auth.otp_expires_in {
        field("Valid for", &format!("{} seconds", secs));
    }
    let email = auth.user.as_ref().map(|u| u.email()).unwrap_or("<email>");
    eprintln!(
        "{}",
        format!(
            "Finish with: vendorflow verify-otp --email {} --otp <code> --purpose {}",
            email, purpose
        )
        .yellow()
    );
}
