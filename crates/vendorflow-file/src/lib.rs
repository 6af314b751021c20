//! vendorflow-file - File-backed credential storage.
//!
//! [`FileStorage`] keeps the session entries (`authToken`, `tokenExpiry`,
//! `userData`) in a private JSON file so a session outlives the process.

mod store;

pub use store::FileStorage;
