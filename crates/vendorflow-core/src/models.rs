//! Account and session payloads exchanged with the VendorFlow API.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifetime the API assigns to access tokens when a response omits it.
pub const DEFAULT_EXPIRES_IN_SECS: i64 = 900;

fn default_expires_in() -> i64 {
    DEFAULT_EXPIRES_IN_SECS
}

/// Tenant role of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Vendor,
    Supplier,
}

impl UserRole {
    /// The dashboard entry point for this role.
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            UserRole::Admin => "/dashboard",
            UserRole::Vendor => "/dashboard/vendor",
            UserRole::Supplier => "/dashboard/supplier",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Vendor => "vendor",
            UserRole::Supplier => "supplier",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The signed-in user's profile, persisted next to the credential.
///
/// Fields the client does not model are kept in `extra` so the stored
/// profile round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl User {
    /// "First Last" when both are known, otherwise the email.
    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{} {}", first, last),
            (Some(name), None) | (None, Some(name)) => name.to_string(),
            (None, None) => self.email.clone(),
        }
    }
}

/// Response from login, register, verify-otp and refresh.
///
/// Registration and 2FA logins answer with `requires_otp` set and no token
/// until `auth/verify-otp` succeeds. Only a response carrying a token
/// establishes a session.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// A one-time password was sent and must be verified to finish.
    #[serde(default, rename = "requiresOtp")]
    pub requires_otp: bool,
    #[serde(default, rename = "twoFactorRequired")]
    pub two_factor_required: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Seconds until the one-time password expires.
    #[serde(default, rename = "expiresIn")]
    pub otp_expires_in: Option<i64>,
}

impl AuthResponse {
    /// The access token, when the response carries a non-empty one.
    pub fn token(&self) -> Option<&str> {
        self.access_token
            .as_deref()
            .filter(|token| !token.trim().is_empty())
    }

    /// The full profile, absent while an OTP step is pending.
    pub fn profile(&self) -> Option<&User> {
        match self.user {
            Some(AuthUser::Profile(ref user)) => Some(user),
            _ => None,
        }
    }
}

/// The user object of an [`AuthResponse`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AuthUser {
    Profile(User),
    /// Partial profile sent before the OTP step completes.
    Pending(PendingUser),
}

impl AuthUser {
    pub fn email(&self) -> &str {
        match self {
            AuthUser::Profile(user) => &user.email,
            AuthUser::Pending(user) => &user.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingUser {
    #[serde(default)]
    pub id: Option<String>,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

/// Registration form for `auth/register`.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterData {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub company_name: String,
    pub role: UserRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
}

impl fmt::Debug for RegisterData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterData")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("company_name", &self.company_name)
            .field("role", &self.role)
            .field("invite_code", &self.invite_code)
            .finish()
    }
}

/// Why a one-time password is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpPurpose {
    Signup,
    Login,
}

/// Response from `auth/send-otp`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpSent {
    pub message: String,
    /// Seconds until the code expires.
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Plain acknowledgement carrying a human-readable message.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_dashboard_paths() {
        assert_eq!(UserRole::Admin.dashboard_path(), "/dashboard");
        assert_eq!(UserRole::Vendor.dashboard_path(), "/dashboard/vendor");
        assert_eq!(UserRole::Supplier.dashboard_path(), "/dashboard/supplier");
    }

    #[test]
    fn user_keeps_unmodelled_fields() {
        let raw = json!({
            "id": "u1",
            "email": "ops@acme.test",
            "firstName": "Ada",
            "lastName": "Park",
            "role": "vendor",
            "department": "Procurement"
        });
        let user: User = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(user.role, UserRole::Vendor);
        assert_eq!(user.display_name(), "Ada Park");
        assert_eq!(serde_json::to_value(&user).unwrap(), raw);
    }

    #[test]
    fn auth_response_defaults_expiry() {
        let resp: AuthResponse = serde_json::from_value(json!({"access_token": "tok"})).unwrap();
        assert_eq!(resp.expires_in, DEFAULT_EXPIRES_IN_SECS);
        assert_eq!(resp.token(), Some("tok"));
        assert!(resp.user.is_none());
        assert!(!resp.requires_otp);
    }

    #[test]
    fn otp_step_response_has_no_token() {
        let resp: AuthResponse = serde_json::from_value(json!({
            "requiresOtp": true,
            "message": "Code sent",
            "expiresIn": 600,
            "user": {"email": "new@acme.test", "firstName": "Lee", "role": "supplier"}
        }))
        .unwrap();
        assert!(resp.requires_otp);
        assert_eq!(resp.token(), None);
        assert_eq!(resp.otp_expires_in, Some(600));
        assert!(resp.profile().is_none());
        match resp.user {
            Some(AuthUser::Pending(ref user)) => {
                assert_eq!(user.email, "new@acme.test");
                assert_eq!(user.role, Some(UserRole::Supplier));
            }
            ref other => panic!("expected pending user, got {:?}", other),
        }
    }

    #[test]
    fn empty_token_is_not_a_token() {
        let resp: AuthResponse =
            serde_json::from_value(json!({"access_token": "  ", "user": null})).unwrap();
        assert_eq!(resp.token(), None);
    }

    #[test]
    fn complete_user_is_a_profile() {
        let resp: AuthResponse = serde_json::from_value(json!({
            "access_token": "tok",
            "user": {"id": "u1", "email": "ops@acme.test", "role": "admin"}
        }))
        .unwrap();
        assert_eq!(resp.profile().map(|u| u.role), Some(UserRole::Admin));
    }

    #[test]
    fn register_data_uses_camel_case() {
        let data = RegisterData {
            email: "new@acme.test".into(),
            password: "Secret#123".into(),
            first_name: "Lee".into(),
            last_name: "Moss".into(),
            company_name: "Acme".into(),
            role: UserRole::Supplier,
            invite_code: None,
        };
        let body = serde_json::to_value(&data).unwrap();
        assert_eq!(body["firstName"], "Lee");
        assert_eq!(body["companyName"], "Acme");
        assert_eq!(body["role"], "supplier");
        assert!(body.get("inviteCode").is_none());
        assert!(!format!("{:?}", data).contains("Secret#123"));
    }
}
