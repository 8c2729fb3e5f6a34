//! HTTP sender seam
//!
//! The transport never touches the wire itself: every attempt goes through
//! an [`HttpSend`] implementation. [`HyperSender`] is the default, plain
//! HTTP/1.1 over hyper's pooled client.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;
use http::header::CONTENT_TYPE;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;

use super::request::OutboundRequest;
use super::response::RawResponse;
use crate::error::{self, Error, Result};

/// Puts one request on the wire and reads the full response.
///
/// Implementations report transport failures as `request-error` and
/// unparseable responses as `invalid-http-response`; any status code that
/// came back is a successful send.
pub trait HttpSend: Send + Sync + fmt::Debug {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'static, Result<RawResponse>>;

    /// Name used in logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Default sender on hyper's connection-pooling client.
#[derive(Clone)]
pub struct HyperSender {
    client: Client<HttpConnector, Full<Bytes>>,
}

impl HyperSender {
    #[must_use]
    pub fn new() -> Self {
        let mut connector = HttpConnector::new();
        connector.set_nodelay(true);
        connector.set_connect_timeout(Some(Duration::from_secs(10)));

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(90))
            .build(connector);
        Self { client }
    }
}

impl Default for HyperSender {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HyperSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperSender").finish_non_exhaustive()
    }
}

impl HttpSend for HyperSender {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'static, Result<RawResponse>> {
        let client = self.client.clone();
        Box::pin(async move {
            let mut builder = http::Request::builder()
                .method(request.method.clone())
                .uri(request.url.as_str());
            if let Some(content_type) = request.content_type() {
                builder = builder.header(CONTENT_TYPE, content_type);
            }
            let outbound = builder
                .body(Full::new(request.body.unwrap_or_default()))
                .map_err(error::builder)?;

            let response = client.request(outbound).await.map_err(classify)?;
            let (parts, body) = response.into_parts();
            let body = body.collect().await.map_err(classify)?.to_bytes();

            Ok(RawResponse {
                status: parts.status.as_u16(),
                headers: parts.headers,
                body,
            })
        })
    }

    fn name(&self) -> &'static str {
        "hyper"
    }
}

/// Malformed responses are `invalid-http-response`; everything else is a
/// transport failure.
fn classify<E>(e: E) -> Error
where
    E: StdError + Send + Sync + 'static,
{
    if is_parse_error(&e) {
        error::invalid_http_response(e)
    } else {
        error::request(e)
    }
}

fn is_parse_error(e: &(dyn StdError + 'static)) -> bool {
    let mut source = Some(e);
    while let Some(err) = source {
        if err
            .downcast_ref::<hyper::Error>()
            .is_some_and(hyper::Error::is_parse)
        {
            return true;
        }
        source = err.source();
    }
    false
}
