//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// Path segment every VendorFlow API route lives under.
pub const API_SEGMENT: &str = "/api";

/// A validated VendorFlow API base URL.
///
/// The URL is absolute, uses `http` or `https`, and always ends with the
/// `/api` segment exactly once, whether or not the configured value carried it.
///
/// # Example
///
/// ```
/// use vendorflow_core::ApiUrl;
///
/// let a = ApiUrl::new("https://api.example.com").unwrap();
/// let b = ApiUrl::new("https://api.example.com/api").unwrap();
/// assert_eq!(a.endpoint_url("orders"), "https://api.example.com/api/orders");
/// assert_eq!(a.endpoint_url("orders"), b.endpoint_url("orders"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Create a new API URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not absolute or uses another scheme.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref().trim();
        let mut url = Url::parse(s).map_err(|e| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        // Normalize: drop trailing slashes, then append the API segment once
        let path = url.path().trim_end_matches('/').to_string();
        let path = if path.ends_with(API_SEGMENT) {
            path
        } else {
            format!("{}{}", path, API_SEGMENT)
        };
        url.set_path(&path);
        url.set_query(None);
        url.set_fragment(None);

        Ok(Self(url))
    }

    /// Returns the full URL for an endpoint.
    ///
    /// A leading `/` on the endpoint is stripped so the result never contains
    /// a doubled separator. Query strings carried by the endpoint are kept.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        format!("{}/{}", base, endpoint)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        if url.cannot_be_a_base() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must be an absolute URL".to_string(),
            }
            .into());
        }

        if !matches!(url.scheme(), "http" | "https") {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must use http or https".to_string(),
            }
            .into());
        }

        if url.host_str().is_none() {
            return Err(InvalidInputError::ApiUrl {
                value: original.to_string(),
                reason: "must have a host".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for ApiUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_api_segment() {
        let url = ApiUrl::new("https://api.example.com").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/api");
        assert_eq!(url.host(), Some("api.example.com"));
    }

    #[test]
    fn join_is_idempotent() {
        let plain = ApiUrl::new("https://api.example.com").unwrap();
        let suffixed = ApiUrl::new("https://api.example.com/api").unwrap();
        let slashed = ApiUrl::new("https://api.example.com/api/").unwrap();

        assert_eq!(plain.endpoint_url("orders"), "https://api.example.com/api/orders");
        assert_eq!(plain, suffixed);
        assert_eq!(suffixed, slashed);
    }

    #[test]
    fn strips_leading_separator_from_endpoint() {
        let url = ApiUrl::new("http://localhost:3001").unwrap();
        assert_eq!(
            url.endpoint_url("/auth/login"),
            "http://localhost:3001/api/auth/login"
        );
        assert_eq!(
            url.endpoint_url("orders?limit=10"),
            "http://localhost:3001/api/orders?limit=10"
        );
    }

    #[test]
    fn keeps_deeper_base_paths() {
        let url = ApiUrl::new("https://example.com/vendorflow/").unwrap();
        assert_eq!(url.endpoint_url("orders"), "https://example.com/vendorflow/api/orders");
    }

    #[test]
    fn does_not_treat_similar_suffix_as_segment() {
        let url = ApiUrl::new("https://example.com/rapi").unwrap();
        assert_eq!(url.as_str(), "https://example.com/rapi/api");
    }

    #[test]
    fn rejects_relative_url() {
        assert!(ApiUrl::new("/api").is_err());
    }

    #[test]
    fn rejects_non_http_scheme() {
        assert!(ApiUrl::new("ftp://example.com").is_err());
        assert!(ApiUrl::new("file:///tmp/api").is_err());
    }
}
