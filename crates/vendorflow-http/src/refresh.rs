//! Deduplicated access token refresh.
//!
//! At most one refresh runs at a time. It is spawned onto the runtime and
//! shared, so every caller that needs a fresh token awaits the same attempt,
//! and a caller that goes away does not stop it.

use std::sync::{Arc, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use vendorflow_core::error::RefreshError;
use vendorflow_core::types::endpoint;
use vendorflow_core::{AccessToken, AuthResponse, LoginRequired};

use crate::client::ClientInner;
use crate::credential_store::now_ms;
use crate::response::server_message;

type RefreshFuture = Shared<BoxFuture<'static, Result<(), RefreshError>>>;

/// The in-flight refresh, if any.
#[derive(Default)]
pub(crate) struct RefreshSlot {
    generation: u64,
    in_flight: Option<RefreshFuture>,
}

/// Empties the slot when the refresh task finishes, unwinding included.
struct InFlightGuard {
    inner: Arc<ClientInner>,
    generation: u64,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut slot = self
            .inner
            .refresh_slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.generation == self.generation {
            slot.in_flight = None;
        }
    }
}

impl ClientInner {
    /// Refresh the access token, joining the attempt already in flight.
    ///
    /// `stale` is the token the caller found unusable. When the store already
    /// holds a different, unexpired token, a refresh settled in between and
    /// no new one is started.
    pub(crate) async fn refresh(
        self: &Arc<Self>,
        stale: Option<&AccessToken>,
    ) -> Result<(), RefreshError> {
        let shared = {
            let mut slot = self.refresh_slot.lock().unwrap_or_else(PoisonError::into_inner);
            match slot.in_flight {
                Some(ref in_flight) => {
                    debug!("Joining token refresh already in flight");
                    in_flight.clone()
                }
                None => {
                    if stale.is_some_and(|stale| self.already_refreshed(stale)) {
                        debug!("Token was refreshed by another request");
                        return Ok(());
                    }
                    slot.generation = slot.generation.wrapping_add(1);
                    let in_flight = self.spawn_refresh(slot.generation);
                    slot.in_flight = Some(in_flight.clone());
                    in_flight
                }
            }
        };
        shared.await
    }

    fn already_refreshed(&self, stale: &AccessToken) -> bool {
        self.credentials
            .current()
            .is_some_and(|current| &current.token != stale && !current.is_expired(now_ms()))
    }

    /// Must be called with the slot locked, so the guard cannot clear it
    /// before the new future is stored.
    fn spawn_refresh(self: &Arc<Self>, generation: u64) -> RefreshFuture {
        let inner = Arc::clone(self);
        let task = tokio::spawn(async move {
            let _guard = InFlightGuard {
                inner: Arc::clone(&inner),
                generation,
            };
            inner.perform_token_refresh().await
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(RefreshError::Interrupted {
                    message: e.to_string(),
                })
            })
        }
        .boxed()
        .shared()
    }

    /// Call `auth/refresh` and apply the result to the credential record.
    ///
    /// On failure the record is cleared and the navigator is told before
    /// the error is returned.
    #[instrument(skip(self), fields(api_url = %self.config.api_url))]
    async fn perform_token_refresh(&self) -> Result<(), RefreshError> {
        info!("Attempting token refresh");

        match self.request_refresh().await {
            Ok(expires_at_ms) => {
                info!(expires_at_ms, "Token refreshed successfully");
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "Token refresh failed");
                self.credentials.clear();
                self.navigator.login_required(LoginRequired::RefreshFailed);
                Err(err)
            }
        }
    }

    async fn request_refresh(&self) -> Result<i64, RefreshError> {
        let url = self.config.api_url.endpoint_url(endpoint::REFRESH);

        // Session cookies ride along from the client's cookie store; no
        // bearer header is sent.
        let response = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|e| RefreshError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<Value>()
                .await
                .ok()
                .as_ref()
                .and_then(server_message);
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|e| RefreshError::InvalidResponse {
                message: e.to_string(),
            })?;
        let credential = self
            .credentials
            .store_auth(&auth)
            .map_err(|e| RefreshError::InvalidResponse {
                message: e.to_string(),
            })?;
        Ok(credential.expires_at_ms)
    }
}
