//! vendorflow-http - Authenticated HTTP client for the VendorFlow API.
//!
//! [`ApiClient`] attaches the bearer token to every protected call,
//! refreshes it shortly before it expires and retries once after a 401.
//! Concurrent callers share a single refresh.
//!
//! # Example
//!
//! ```no_run
//! use vendorflow_core::LoginCredentials;
//! use vendorflow_http::{ApiClient, ClientConfig, RequestOptions};
//!
//! # async fn example() -> vendorflow_core::Result<()> {
//! let client = ApiClient::new(ClientConfig::from_env()?)?;
//! client
//!     .login(&LoginCredentials::new("ops@acme.test", "Secret#123"))
//!     .await?;
//!
//! let orders = client.request("orders", RequestOptions::get()).await?;
//! println!("{:?}", orders.as_json());
//! # Ok(())
//! # }
//! ```

mod auth;
mod client;
pub mod config;
pub mod credential_store;
mod endpoints;
mod refresh;
mod resources;
mod response;

pub use client::{ApiClient, ApiClientBuilder, RequestOptions};
pub use config::ClientConfig;
pub use credential_store::{Credential, CredentialStore, REFRESH_SKEW_MS};
pub use resources::{Resource, StockAdjustment, with_query};
pub use response::ResponseBody;

// Callers build abort handles with the same futures version.
pub use futures_util::future::{AbortHandle, AbortRegistration};
pub use reqwest::Method;
