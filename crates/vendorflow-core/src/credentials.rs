//! Login credentials type.

use std::fmt;

use serde::Serialize;

/// Login credentials for `auth/login`.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use vendorflow_core::LoginCredentials;
///
/// let creds = LoginCredentials::new("ops@acme.test", "hunter2");
/// assert_eq!(creds.email(), "ops@acme.test");
/// ```
#[derive(Clone, Serialize)]
pub struct LoginCredentials {
    email: String,
    password: String,
}

impl LoginCredentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the account email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the password.
    ///
    /// # Security
    ///
    /// Use this only when constructing authentication requests.
    /// Never log or display this value.
    pub fn password(&self) -> &str {
        &self.password
    }
}

// Intentionally hide password in Debug output
impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hide_password_in_debug() {
        let creds = LoginCredentials::new("ops@acme.test", "secret123");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("ops@acme.test"));
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn credentials_serialize_as_login_body() {
        let creds = LoginCredentials::new("ops@acme.test", "secret123");
        let body = serde_json::to_value(&creds).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"email": "ops@acme.test", "password": "secret123"})
        );
    }
}
