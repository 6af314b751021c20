//! Persistent key/value storage for the session.

use crate::Result;

/// Storage key of the bearer token.
pub const TOKEN_KEY: &str = "authToken";

/// Storage key of the token expiry, epoch milliseconds as a decimal string.
pub const EXPIRY_KEY: &str = "tokenExpiry";

/// Storage key of the serialized user profile.
pub const USER_KEY: &str = "userData";

/// Client-side storage the credential record is mirrored into.
///
/// Operations are synchronous and expected to be cheap; implementations
/// must tolerate concurrent calls from several tasks.
pub trait CredentialStorage: Send + Sync {
    /// Read a value. Missing keys are `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Delete a value. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
