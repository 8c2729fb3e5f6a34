//! Response types
//!
//! `RawResponse` is what a sender reads off the wire. `HttpResult` is the
//! validated, host-tagged outcome of one attempt. `Response` is the success
//! value of the blocking API and parses its body on demand.

use std::borrow::Cow;

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::connection::HostAddress;
use crate::error::{self, Error, Result};

/// Status, headers and body exactly as received.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl RawResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }
}

/// Well-formed HTTP answer to a single attempt, whatever its status.
#[derive(Debug, Clone)]
pub struct HttpResult {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Bytes>,
    host: HostAddress,
}

impl HttpResult {
    /// Validate the raw status and tag the result with the host that served it.
    ///
    /// # Errors
    ///
    /// Returns `invalid-http-response` when the status is not a valid HTTP
    /// status code.
    pub fn from_raw(raw: RawResponse, host: HostAddress) -> Result<Self> {
        let status = StatusCode::from_u16(raw.status).map_err(|e| {
            error::invalid_http_response(e)
                .with_host(host.clone())
                .with_body(raw.body.clone())
        })?;
        Ok(Self {
            status,
            headers: raw.headers,
            body: (!raw.body.is_empty()).then_some(raw.body),
            host,
        })
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    #[must_use]
    pub fn host(&self) -> &HostAddress {
        &self.host
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Classify for the blocking API.
    ///
    /// 2xx is a success. Any other status is an API rejection carrying the
    /// parsed body, unless the body is not JSON at all, which is reported as
    /// `invalid-json-response` since it usually comes from an intermediary
    /// rather than the cluster.
    ///
    /// # Errors
    ///
    /// `api-error` or `invalid-json-response` as described above.
    pub fn into_response(self) -> Result<Response> {
        if self.status.is_success() {
            return Ok(Response {
                status: self.status,
                headers: self.headers,
                body: self.body,
                host: self.host,
            });
        }

        let json = match &self.body {
            None => None,
            Some(body) => match serde_json::from_slice::<serde_json::Value>(body) {
                Ok(json) => Some(json),
                Err(e) => {
                    return Err(error::invalid_json_response(e, body.clone())
                        .with_status(self.status)
                        .with_host(self.host));
                }
            },
        };
        Err(error::api(self.status, json).with_host(self.host))
    }
}

/// Successful (2xx) answer returned by the blocking API.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Bytes>,
    host: HostAddress,
}

impl Response {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Host that served the response.
    #[must_use]
    pub fn host(&self) -> &HostAddress {
        &self.host
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as text, lossily decoded; empty when there is no body.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        match &self.body {
            Some(body) => String::from_utf8_lossy(body),
            None => Cow::Borrowed(""),
        }
    }

    /// Parse the body as JSON. An absent body parses as an empty object.
    ///
    /// # Errors
    ///
    /// Returns `invalid-json-response` if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value> {
        match &self.body {
            None => Ok(serde_json::Value::Object(serde_json::Map::new())),
            Some(body) => serde_json::from_slice(body).map_err(|e| self.json_error(e, body)),
        }
    }

    /// Deserialize the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns `invalid-json-response` if the body does not match `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self.body.clone().unwrap_or_else(|| Bytes::from_static(b"{}"));
        serde_json::from_slice(&body).map_err(|e| self.json_error(e, &body))
    }

    fn json_error(&self, e: serde_json::Error, body: &Bytes) -> Error {
        error::invalid_json_response(e, body.clone())
            .with_status(self.status)
            .with_host(self.host.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::config::Scheme;

    fn result(status: u16, body: &'static [u8]) -> HttpResult {
        let host = HostAddress::parse("localhost:9200", Scheme::Http).expect("valid host");
        HttpResult::from_raw(RawResponse::new(status, Bytes::from_static(body)), host)
            .expect("valid status")
    }

    #[test]
    fn out_of_range_status_is_not_http() {
        let host = HostAddress::parse("localhost:9200", Scheme::Http).expect("valid host");
        let err = HttpResult::from_raw(RawResponse::new(42, Bytes::new()), host)
            .expect_err("42 is not a status");
        assert!(err.is_invalid_http_response());
    }

    #[test]
    fn success_parses_json_on_demand() {
        let response = result(200, br#"{"cluster_name":"books"}"#)
            .into_response()
            .expect("2xx");
        let json = response.json().expect("json");
        assert_eq!(json["cluster_name"], "books");
        assert_eq!(response.text(), r#"{"cluster_name":"books"}"#);
    }

    #[test]
    fn empty_success_body_is_an_empty_object() {
        let response = result(200, b"").into_response().expect("2xx");
        assert!(response.body().is_none());
        assert_eq!(response.json().expect("json"), serde_json::json!({}));
    }

    #[test]
    fn typed_bodies_deserialize() {
        #[derive(Deserialize)]
        struct Count {
            count: u64,
        }
        let response = result(200, br#"{"count":7}"#).into_response().expect("2xx");
        assert_eq!(response.json_as::<Count>().expect("typed").count, 7);
    }

    #[test]
    fn non_2xx_with_json_is_an_api_error() {
        let err = result(404, br#"{"found":false}"#)
            .into_response()
            .expect_err("404");
        assert!(err.is_api());
        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(err.json(), Some(&serde_json::json!({"found": false})));
        assert!(!err.is_retryable());
    }

    #[test]
    fn non_2xx_without_body_is_an_api_error() {
        let err = result(404, b"").into_response().expect_err("404");
        assert!(err.is_api());
        assert!(err.json().is_none());
    }

    #[test]
    fn non_2xx_html_is_invalid_json() {
        let err = result(502, b"<html>bad gateway</html>")
            .into_response()
            .expect_err("502");
        assert!(err.is_invalid_json());
        assert!(err.is_retryable());
        assert_eq!(err.status(), Some(StatusCode::BAD_GATEWAY));
    }

    #[test]
    fn malformed_success_body_fails_to_parse() {
        let response = result(200, b"not json").into_response().expect("2xx");
        assert!(response.json().expect_err("invalid").is_invalid_json());
    }
}
