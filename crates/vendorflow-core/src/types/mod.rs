//! Core request addressing types.
//!
//! These types enforce their invariants at construction time,
//! so an invalid base URL never reaches the request executor.

mod api_url;
pub mod endpoint;

pub use api_url::{API_SEGMENT, ApiUrl};
pub use endpoint::Endpoint;
