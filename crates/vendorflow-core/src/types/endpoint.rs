//! API endpoint paths and their authentication class.

use std::fmt;

/// POST auth/login
pub const LOGIN: &str = "auth/login";

/// POST auth/register
pub const REGISTER: &str = "auth/register";

/// POST auth/refresh
pub const REFRESH: &str = "auth/refresh";

/// POST auth/logout
pub const LOGOUT: &str = "auth/logout";

/// POST auth/send-otp
pub const SEND_OTP: &str = "auth/send-otp";

/// POST auth/verify-otp
pub const VERIFY_OTP: &str = "auth/verify-otp";

/// POST auth/forgot-password
pub const FORGOT_PASSWORD: &str = "auth/forgot-password";

/// POST auth/reset-password
pub const RESET_PASSWORD: &str = "auth/reset-password";

/// POST users/profile/change-password
pub const CHANGE_PASSWORD: &str = "users/profile/change-password";

/// Endpoints that establish credentials and so must not require them.
const CREDENTIAL_ESTABLISHING: &[&str] = &[
    LOGIN,
    REGISTER,
    SEND_OTP,
    VERIFY_OTP,
    FORGOT_PASSWORD,
    RESET_PASSWORD,
    REFRESH,
];

const AUTH_PREFIX: &str = "auth/";

/// A request target relative to the API base URL.
///
/// Holds the endpoint as given (minus any leading `/`), including an
/// optional query string.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        Self(endpoint.as_ref().trim_start_matches('/').to_string())
    }

    /// The endpoint with its query string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The endpoint path without query string or trailing `/`.
    pub fn path(&self) -> &str {
        let path = match self.0.split_once('?') {
            Some((path, _)) => path,
            None => &self.0,
        };
        path.trim_end_matches('/')
    }

    /// True for endpoints that create a session: no credential check and no
    /// bearer header is applied to them.
    pub fn establishes_credentials(&self) -> bool {
        CREDENTIAL_ESTABLISHING.contains(&self.path())
    }

    /// True for every endpoint under `auth/`. A 401 from one of these is
    /// final and never triggers a refresh-and-retry.
    pub fn is_auth(&self) -> bool {
        let path = self.path();
        path == "auth" || path.starts_with(AUTH_PREFIX)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Endpoint {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
