//! vendorflow-core - Core types and traits for the VendorFlow API client.

pub mod credentials;
pub mod error;
pub mod memory;
pub mod models;
pub mod password;
pub mod tokens;
pub mod traits;
pub mod types;

pub use credentials::LoginCredentials;
pub use error::Error;
pub use memory::MemoryStorage;
pub use models::{
    AuthResponse, AuthUser, MessageResponse, OtpPurpose, OtpSent, PendingUser, RegisterData, User,
    UserRole,
};
pub use password::{PasswordStrength, PasswordValidation, validate_password};
pub use tokens::AccessToken;
pub use traits::{CredentialStorage, LogNavigator, LoginRequired, Navigator};
pub use types::{ApiUrl, Endpoint};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
