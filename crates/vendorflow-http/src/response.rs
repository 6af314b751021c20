//! Response classification and body parsing.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use reqwest::header::{CONTENT_TYPE, HeaderMap, RETRY_AFTER};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::trace;

use vendorflow_core::error::{DEFAULT_RETRY_AFTER_MS, ServerError, TransportError};
use vendorflow_core::{Error, Result};

/// A parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The response declared a JSON media type.
    Json(Value),
    /// Anything else, returned verbatim.
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Json(_) => None,
            ResponseBody::Text(text) => Some(text),
        }
    }

    /// Decode a JSON body into `T`. A text body is a decode error.
    pub fn into_json<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            ResponseBody::Json(value) => Ok(serde_json::from_value(value)?),
            ResponseBody::Text(text) => Err(Error::decode(format!(
                "expected a JSON body, got {} bytes of text",
                text.len()
            ))),
        }
    }
}

/// What a single HTTP exchange produced.
#[derive(Debug)]
pub(crate) enum Outcome {
    Success(ResponseBody),
    /// 401. Whether it is retried depends on the endpoint.
    Unauthorized(ServerError),
    Failed(Error),
}

impl Outcome {
    pub(crate) fn into_result(self) -> Result<ResponseBody> {
        match self {
            Outcome::Success(body) => Ok(body),
            Outcome::Unauthorized(err) => Err(Error::Server(err)),
            Outcome::Failed(err) => Err(err),
        }
    }
}

pub(crate) async fn classify(response: reqwest::Response) -> Outcome {
    let status = response.status();
    trace!(status = %status, "API response");

    if status == StatusCode::TOO_MANY_REQUESTS {
        let retry_after_ms = retry_after_ms(response.headers(), Utc::now());
        return Outcome::Failed(Error::RateLimited { retry_after_ms });
    }

    let body = match read_body(response).await {
        Ok(body) => body,
        Err(err) if status.is_success() => return Outcome::Failed(err),
        // An unreadable error body still yields a status error.
        Err(_) => ResponseBody::Text(String::new()),
    };

    if status.is_success() {
        return Outcome::Success(body);
    }

    let err = ServerError::new(
        status.as_u16(),
        status.canonical_reason().unwrap_or(""),
        body.as_json().and_then(server_message),
    );
    if err.is_unauthorized() {
        Outcome::Unauthorized(err)
    } else {
        Outcome::Failed(Error::Server(err))
    }
}

async fn read_body(response: reqwest::Response) -> Result<ResponseBody> {
    let json = is_json_content_type(response.headers());
    let text = response.text().await.map_err(transport_error)?;

    if !json {
        return Ok(ResponseBody::Text(text));
    }
    // Empty bodies (204 and friends) read as null.
    if text.trim().is_empty() {
        return Ok(ResponseBody::Json(Value::Null));
    }
    Ok(ResponseBody::Json(serde_json::from_str(&text)?))
}

/// True when `content-type` names `application/json` or a `+json` type.
pub(crate) fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let media_type = value
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json" || media_type.ends_with("+json")
}

/// The `message` field (a string, or a list of strings) falling back to
/// `error`.
pub(crate) fn server_message(body: &Value) -> Option<String> {
    let from_field = |field: &str| match body.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => {
            let parts: Vec<&str> = items.iter().filter_map(Value::as_str).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    };
    from_field("message").or_else(|| from_field("error"))
}

/// Wait requested by a 429 response, in milliseconds.
///
/// Accepts delta-seconds or an HTTP-date. Anything else, including a missing
/// header, yields [`DEFAULT_RETRY_AFTER_MS`].
pub(crate) fn retry_after_ms(headers: &HeaderMap, now: DateTime<Utc>) -> u64 {
    let Some(value) = headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok()) else {
        return DEFAULT_RETRY_AFTER_MS;
    };
    let value = value.trim();

    if let Ok(secs) = value.parse::<u64>() {
        return secs.saturating_mul(1000);
    }
    match DateTime::parse_from_rfc2822(value) {
        Ok(at) => {
            let wait = at.with_timezone(&Utc) - now;
            u64::try_from(wait.num_milliseconds()).unwrap_or(0)
        }
        Err(_) => DEFAULT_RETRY_AFTER_MS,
    }
}

pub(crate) fn transport_error(err: reqwest::Error) -> Error {
    let transport = if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connection {
            message: err.to_string(),
        }
    } else {
        TransportError::Http {
            message: err.to_string(),
        }
    };
    Error::Transport(transport)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn headers(name: reqwest::header::HeaderName, value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn json_content_types() {
        assert!(is_json_content_type(&headers(CONTENT_TYPE, "application/json")));
        assert!(is_json_content_type(&headers(
            CONTENT_TYPE,
            "Application/JSON; charset=utf-8"
        )));
        assert!(is_json_content_type(&headers(
            CONTENT_TYPE,
            "application/problem+json"
        )));
        assert!(!is_json_content_type(&headers(CONTENT_TYPE, "text/plain")));
        assert!(!is_json_content_type(&HeaderMap::new()));
    }

    #[test]
    fn server_message_shapes() {
        assert_eq!(
            server_message(&json!({"message": "Invalid credentials"})).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            server_message(&json!({"message": ["email must be an email", "password too short"]}))
                .as_deref(),
            Some("email must be an email, password too short")
        );
        assert_eq!(
            server_message(&json!({"error": "Forbidden"})).as_deref(),
            Some("Forbidden")
        );
        assert_eq!(server_message(&json!({"statusCode": 500})), None);
    }

    #[test]
    fn retry_after_seconds() {
        let now = Utc::now();
        assert_eq!(retry_after_ms(&headers(RETRY_AFTER, "10"), now), 10_000);
        assert_eq!(retry_after_ms(&HeaderMap::new(), now), DEFAULT_RETRY_AFTER_MS);
        assert_eq!(
            retry_after_ms(&headers(RETRY_AFTER, "later"), now),
            DEFAULT_RETRY_AFTER_MS
        );
    }

    #[test]
    fn retry_after_http_date() {
        let now = DateTime::parse_from_rfc2822("Wed, 21 Oct 2026 07:28:00 GMT")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(
            retry_after_ms(&headers(RETRY_AFTER, "Wed, 21 Oct 2026 07:28:30 GMT"), now),
            30_000
        );
        assert_eq!(
            retry_after_ms(&headers(RETRY_AFTER, "Wed, 21 Oct 2026 07:27:00 GMT"), now),
            0
        );
    }

    #[test]
    fn text_body_is_not_json() {
        let body = ResponseBody::Text("pong".into());
        assert_eq!(body.as_text(), Some("pong"));
        assert!(body.into_json::<Value>().is_err());
    }
}
