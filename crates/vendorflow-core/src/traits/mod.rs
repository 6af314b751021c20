//! Seams the request client is built against.

mod navigator;
mod storage;

pub use navigator::{LogNavigator, LoginRequired, Navigator};
pub use storage::{CredentialStorage, EXPIRY_KEY, TOKEN_KEY, USER_KEY};
