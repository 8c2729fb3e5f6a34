//! Cluster discovery
//!
//! The sniffer asks one node for the cluster's node list and turns it into
//! host addresses. Discovery is best effort: any failure yields an empty
//! list, which the transport treats as "keep the hosts you have".

use std::sync::Arc;

use serde_json::Value;

use crate::config::Scheme;
use crate::connection::HostAddress;
use crate::error::Result;
use crate::http::Request;
use crate::transport::state::TransportCore;

/// Node-info endpoint queried for HTTP addresses.
pub const NODES_PATH: &str = "_nodes/http";

/// Queries the cluster through the transport it belongs to.
pub struct Sniffer {
    core: Arc<TransportCore>,
}

impl Sniffer {
    pub(crate) fn new(core: Arc<TransportCore>) -> Self {
        Self { core }
    }

    /// Hosts currently published by the cluster, or none on any failure.
    ///
    /// The discovery request takes a connection straight from the pool and
    /// does not count toward the reload threshold, so it can never trigger
    /// another sniff.
    pub async fn hosts(&self) -> Vec<HostAddress> {
        match self.fetch().await {
            Ok(json) => {
                let hosts = parse_nodes(&json, self.core.scheme);
                if hosts.is_empty() {
                    tracing::warn!("node info response listed no usable addresses");
                }
                hosts
            }
            Err(e) => {
                tracing::warn!(error = %e, "sniffing cluster nodes failed");
                Vec::new()
            }
        }
    }

    async fn fetch(&self) -> Result<Value> {
        let connection = self.core.sniff_connection()?;
        let request = Request::get(NODES_PATH);
        let result = self.core.send_on(&connection, &request).await?;
        result.into_response()?.json()
    }
}

/// Extract host addresses from a node-info document.
///
/// Each entry under `nodes` contributes its `<scheme>_address` field, or
/// `http.publish_address` when that field is absent. Entries without a
/// parseable address are skipped; a document without a `nodes` object
/// yields nothing.
#[must_use]
pub fn parse_nodes(json: &Value, scheme: Scheme) -> Vec<HostAddress> {
    let Some(nodes) = json.get("nodes").and_then(Value::as_object) else {
        return Vec::new();
    };
    let field = scheme.address_field();

    nodes
        .iter()
        .filter_map(|(id, node)| {
            let address = node
                .get(&field)
                .and_then(Value::as_str)
                .or_else(|| node.pointer("/http/publish_address").and_then(Value::as_str))?;
            match HostAddress::parse(address, scheme) {
                Ok(host) => Some(host),
                Err(e) => {
                    tracing::debug!(node = %id, address, error = %e, "skipping node address");
                    None
                }
            }
        })
        .collect()
}
