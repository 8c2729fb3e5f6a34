//! Shared fixtures: a scripted sender that records every request it sees.

#![allow(dead_code)]

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use futures::future::BoxFuture;

use eskit_client::error;
use eskit_client::http::{HttpSend, OutboundRequest, RawResponse};
use eskit_client::{Result, TransportSettings};

type Handler = dyn Fn(&OutboundRequest) -> Result<RawResponse> + Send + Sync;

/// Sender whose replies come from a closure instead of the network.
#[derive(Clone)]
pub struct ScriptedSender {
    handler: Arc<Handler>,
    log: Arc<Mutex<Vec<OutboundRequest>>>,
    delay: Option<Duration>,
}

impl ScriptedSender {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&OutboundRequest) -> Result<RawResponse> + Send + Sync + 'static,
    {
        Self {
            handler: Arc::new(handler),
            log: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Hold every reply for `delay` before answering.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn sent(&self) -> Vec<OutboundRequest> {
        self.log.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// `host:port` of every request, in order.
    pub fn authorities(&self) -> Vec<String> {
        self.sent()
            .iter()
            .map(|r| format!("{}:{}", r.url.host_str().unwrap(), r.url.port().unwrap()))
            .collect()
    }

    pub fn paths(&self) -> Vec<String> {
        self.sent().iter().map(|r| r.url.path().to_string()).collect()
    }
}

impl fmt::Debug for ScriptedSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptedSender")
            .field("sent", &self.sent_count())
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl HttpSend for ScriptedSender {
    fn send(&self, request: OutboundRequest) -> BoxFuture<'static, Result<RawResponse>> {
        self.log.lock().unwrap().push(request.clone());
        let reply = (self.handler)(&request);
        let delay = self.delay;
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            reply
        })
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

pub fn json(status: u16, body: &str) -> Result<RawResponse> {
    Ok(RawResponse::new(status, Bytes::copy_from_slice(body.as_bytes())))
}

pub fn refused() -> Result<RawResponse> {
    Err(error::request("connection refused"))
}

/// Settings with no retry delay so tests run quickly.
pub fn fast_settings() -> TransportSettings {
    TransportSettings::default().with_retry_delay(Duration::ZERO, Duration::from_secs(1))
}

/// Node-info document listing `addresses` as `http_address` entries.
pub fn nodes_document(addresses: &[&str]) -> String {
    let nodes: serde_json::Map<String, serde_json::Value> = addresses
        .iter()
        .enumerate()
        .map(|(i, address)| {
            (
                format!("node-{i}"),
                serde_json::json!({ "http_address": format!("inet[/{address}]") }),
            )
        })
        .collect();
    serde_json::json!({ "cluster_name": "test", "nodes": nodes }).to_string()
}
