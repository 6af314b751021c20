//! The authenticated request executor.

use std::sync::{Arc, Mutex};

use futures_util::future::{AbortRegistration, Abortable};
use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use vendorflow_core::error::InvalidInputError;
use vendorflow_core::{
    AccessToken, CredentialStorage, Endpoint, Error, LogNavigator, LoginRequired, MemoryStorage,
    Navigator, Result,
};

use crate::config::ClientConfig;
use crate::credential_store::{CredentialStore, now_ms};
use crate::refresh::RefreshSlot;
use crate::response::{Outcome, ResponseBody, classify, transport_error};

/// Options for a single [`ApiClient::request`] call.
#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
    abort: Option<AbortRegistration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: None,
            headers: Vec::new(),
            abort: None,
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn patch() -> Self {
        Self::new(Method::PATCH)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn delete() -> Self {
        Self::new(Method::DELETE)
    }

    /// Serialize `body` as the JSON request body.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Use an already-built JSON value as the request body.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Add a header. Validated when the request is sent.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Tie the call to an [`AbortHandle`](futures_util::future::AbortHandle).
    /// Aborting yields [`Error::Cancelled`].
    pub fn abortable(mut self, registration: AbortRegistration) -> Self {
        self.abort = Some(registration);
        self
    }
}

pub(crate) struct ClientInner {
    pub(crate) http: reqwest::Client,
    pub(crate) config: ClientConfig,
    pub(crate) credentials: CredentialStore,
    pub(crate) navigator: Arc<dyn Navigator>,
    pub(crate) refresh_slot: Mutex<RefreshSlot>,
}

/// Client for the VendorFlow API.
///
/// Cloning is cheap; clones share the credential record and the in-flight
/// refresh. Requests must run inside a tokio runtime.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) inner: Arc<ClientInner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_url", &self.inner.config.api_url)
            .field("credentials", &self.inner.credentials)
            .finish()
    }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    config: ClientConfig,
    storage: Option<Arc<dyn CredentialStorage>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl ApiClientBuilder {
    /// Persist the credential record in `storage`. Defaults to
    /// [`MemoryStorage`].
    pub fn storage(mut self, storage: Arc<dyn CredentialStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Hook called when the user must sign in again. Defaults to
    /// [`LogNavigator`].
    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Build the client and load any persisted credential.
    pub fn build(self) -> Result<ApiClient> {
        let mut http = reqwest::Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .cookie_store(true);
        if let Some(timeout) = self.config.timeout {
            http = http.timeout(timeout);
        }
        let http = http.build().map_err(transport_error)?;

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let credentials = CredentialStore::new(storage);
        credentials.hydrate();

        Ok(ApiClient {
            inner: Arc::new(ClientInner {
                http,
                config: self.config,
                credentials,
                navigator: self.navigator.unwrap_or_else(|| Arc::new(LogNavigator)),
                refresh_slot: Mutex::new(RefreshSlot::default()),
            }),
        })
    }
}

impl ApiClient {
    pub fn builder(config: ClientConfig) -> ApiClientBuilder {
        ApiClientBuilder {
            config,
            storage: None,
            navigator: None,
        }
    }

    /// A client with in-memory storage and the logging navigator.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    /// Perform one logical call against the API.
    ///
    /// Protected endpoints get a valid bearer token first (refreshing it when
    /// it is within the expiry skew) and one refresh-and-retry on 401.
    #[instrument(skip(self, endpoint, options), fields(method = %options.method, endpoint = tracing::field::Empty))]
    pub async fn request(
        &self,
        endpoint: impl Into<Endpoint>,
        options: RequestOptions,
    ) -> Result<ResponseBody> {
        let endpoint = endpoint.into();
        tracing::Span::current().record("endpoint", endpoint.as_str());

        let RequestOptions {
            method,
            body,
            headers,
            abort,
        } = options;
        let headers = parse_headers(&headers)?;
        let call = self.execute(&endpoint, &method, body.as_ref(), &headers);

        match abort {
            Some(registration) => Abortable::new(call, registration)
                .await
                .unwrap_or_else(|_| {
                    debug!("Request aborted by caller");
                    Err(Error::Cancelled)
                }),
            None => call.await,
        }
    }

    async fn execute(
        &self,
        endpoint: &Endpoint,
        method: &Method,
        body: Option<&Value>,
        headers: &HeaderMap,
    ) -> Result<ResponseBody> {
        let url = self.inner.config.api_url.endpoint_url(endpoint.as_str());

        let token = if endpoint.establishes_credentials() {
            None
        } else {
            Some(self.inner.ensure_valid_token().await?)
        };

        let outcome = self
            .inner
            .send(method, &url, body, headers, token.as_ref())
            .await?;

        match outcome {
            Outcome::Unauthorized(_) if !endpoint.is_auth() => {
                self.retry_after_unauthorized(method, &url, body, headers, token)
                    .await
            }
            outcome => outcome.into_result(),
        }
    }

    /// The single retry cycle after a 401: refresh, then resend once with
    /// whatever token the refresh left behind.
    async fn retry_after_unauthorized(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        headers: &HeaderMap,
        rejected: Option<AccessToken>,
    ) -> Result<ResponseBody> {
        debug!("401 received, refreshing token and retrying once");
        self.inner.refresh(rejected.as_ref()).await?;

        let Some(token) = self.inner.credentials.access_token() else {
            return Err(Error::Unauthenticated);
        };
        self.inner
            .send(method, url, body, headers, Some(&token))
            .await?
            .into_result()
    }

    /// Force a token refresh, joining one already in flight.
    #[instrument(skip(self))]
    pub async fn refresh_token(&self) -> Result<()> {
        self.inner.refresh(None).await?;
        Ok(())
    }
}

impl ClientInner {
    /// Make sure a usable token is held, refreshing it when it is within the
    /// expiry skew.
    async fn ensure_valid_token(self: &Arc<Self>) -> Result<AccessToken> {
        let credential = match self.credentials.current() {
            Some(credential) => credential,
            None => {
                self.credentials.hydrate();
                match self.credentials.current() {
                    Some(credential) => credential,
                    None => {
                        warn!("No access token available");
                        self.navigator.login_required(LoginRequired::NoCredential);
                        return Err(Error::Unauthenticated);
                    }
                }
            }
        };

        if !credential.is_expired(now_ms()) {
            return Ok(credential.token);
        }

        debug!("Access token expired or about to expire, refreshing");
        self.refresh(Some(&credential.token)).await?;
        self.credentials
            .access_token()
            .ok_or(Error::Unauthenticated)
    }

    async fn send(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        headers: &HeaderMap,
        token: Option<&AccessToken>,
    ) -> Result<Outcome> {
        let mut request_headers = HeaderMap::new();
        request_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        request_headers.extend(headers.clone());
        if let Some(token) = token {
            let mut value =
                HeaderValue::from_str(&token.bearer()).map_err(|e| InvalidInputError::Token {
                    reason: e.to_string(),
                })?;
            value.set_sensitive(true);
            request_headers.insert(AUTHORIZATION, value);
        }

        debug!(%method, url, authenticated = token.is_some(), "API request");

        let mut request = self
            .http
            .request(method.clone(), url)
            .headers(request_headers);
        if let Some(body) = body {
            request = request.body(serde_json::to_vec(body)?);
        }

        let response = request.send().await.map_err(transport_error)?;
        Ok(classify(response).await)
    }
}

fn parse_headers(headers: &[(String, String)]) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        let invalid = |reason: String| InvalidInputError::Header {
            name: name.clone(),
            reason,
        };
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
        let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vendorflow_core::ApiUrl;

    #[test]
    fn options_builders() {
        let options = RequestOptions::patch()
            .json(&serde_json::json!({"status": "shipped"}))
            .unwrap()
            .header("X-Request-Id", "abc");
        assert_eq!(options.method, Method::PATCH);
        assert_eq!(options.body.unwrap()["status"], "shipped");
        assert_eq!(options.headers, vec![("X-Request-Id".into(), "abc".into())]);
        assert_eq!(RequestOptions::default().method, Method::GET);
    }

    #[test]
    fn bad_headers_are_rejected() {
        assert!(parse_headers(&[("X-Ok".into(), "fine".into())]).is_ok());
        let err = parse_headers(&[("Bad Name".into(), "v".into())]).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidInput(InvalidInputError::Header { .. })
        ));
        assert!(parse_headers(&[("X-Bad".into(), "line\nbreak".into())]).is_err());
    }

    #[test]
    fn debug_hides_token() {
        let config = ClientConfig::new(ApiUrl::new("https://api.example.com").unwrap());
        let client = ApiClient::new(config).unwrap();
        client
            .credentials()
            .set(AccessToken::new("secret-token").unwrap(), 900);
        let debug = format!("{:?}", client);
        assert!(debug.contains("api.example.com"));
        assert!(!debug.contains("secret-token"));
    }
}
