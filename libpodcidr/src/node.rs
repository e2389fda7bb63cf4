use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use etcd_client::Client;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::cidr::parse_cidr;
use crate::error::PodCidrError;

/// Annotation carrying the pod CIDR when `spec.podCIDR` is unset.
/// Every component that reads or writes the fallback must use exactly
/// this key.
pub const POD_CIDR_ANNOTATION: &str = "rkr.rk8s.io/pod-cidr";

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default)]
    pub annotations: HashMap<String, String>,
}

/// Node spec
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct NodeSpec {
    // Pod network CIDR assigned to this node; empty until the control
    // plane allocates one
    #[serde(rename = "podCIDR", default)]
    pub pod_cidr: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Node {
    #[serde(rename = "apiVersion", default)]
    pub api_version: String,
    #[serde(rename = "kind", default)]
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: NodeSpec,
}

/// Read-only "get node by name" view of the cluster store.
///
/// The resolver takes this as a trait object so tests can substitute an
/// in-memory map for the xline-backed store.
#[async_trait]
pub trait NodeStore: Send + Sync {
    async fn get_node(&self, node_name: &str) -> Result<Option<Node>>;
}

/// like etcd, k:/registry/nodes/node_name v:yaml file of node
#[derive(Clone)]
pub struct XlineNodeStore {
    client: Arc<RwLock<Client>>,
}

impl XlineNodeStore {
    pub async fn new(endpoints: &[&str]) -> Result<Self> {
        let client = Client::connect(endpoints, None).await?;
        Ok(Self {
            client: Arc::new(RwLock::new(client)),
        })
    }

    pub async fn get_node_yaml(&self, node_name: &str) -> Result<Option<String>> {
        let key = format!("/registry/nodes/{node_name}");
        let mut client = self.client.write().await;
        let resp = client.get(key, None).await?;
        Ok(resp
            .kvs()
            .first()
            .map(|kv| String::from_utf8_lossy(kv.value()).to_string()))
    }
}

#[async_trait]
impl NodeStore for XlineNodeStore {
    async fn get_node(&self, node_name: &str) -> Result<Option<Node>> {
        if let Some(yaml) = self.get_node_yaml(node_name).await? {
            let node: Node = serde_yaml::from_str(&yaml)
                .with_context(|| format!("Failed to parse node {node_name} yaml"))?;
            Ok(Some(node))
        } else {
            Ok(None)
        }
    }
}

/// Decide the pod CIDR for `node_name`.
///
/// Priority, first match wins: the explicit override (no store call is
/// made), the node's `spec.podCIDR`, then the [`POD_CIDR_ANNOTATION`]
/// annotation. Every source passes through the same validation gate.
/// `Ok(None)` means no source had a value; whether that is fatal is the
/// caller's call.
pub async fn resolve_node_cidr(
    store: &dyn NodeStore,
    node_name: &str,
    cidr_override: Option<&str>,
) -> Result<Option<String>, PodCidrError> {
    if let Some(cidr) = cidr_override.filter(|s| !s.is_empty()) {
        parse_cidr(cidr)?;
        info!("using pod CIDR {cidr} from explicit override");
        return Ok(Some(cidr.to_string()));
    }

    let node = store
        .get_node(node_name)
        .await
        .map_err(|e| PodCidrError::NodeLookup {
            node: node_name.to_string(),
            source: e,
        })?
        .ok_or_else(|| PodCidrError::NodeLookup {
            node: node_name.to_string(),
            source: anyhow!("node not found"),
        })?;

    if !node.spec.pod_cidr.is_empty() {
        parse_cidr(&node.spec.pod_cidr)?;
        info!(
            "using pod CIDR {} from spec.podCIDR of node {node_name}",
            node.spec.pod_cidr
        );
        return Ok(Some(node.spec.pod_cidr));
    }

    if let Some(annotation) = node.metadata.annotations.get(POD_CIDR_ANNOTATION) {
        debug!("node {node_name} carries pod CIDR annotation {annotation}");
        let net = parse_cidr(annotation).map_err(|e| match e {
            PodCidrError::InvalidCidr(cidr) => PodCidrError::InvalidCidr(format!(
                "{cidr} in node annotation {POD_CIDR_ANNOTATION}"
            )),
            other => other,
        })?;
        info!("using pod CIDR {net} from annotation of node {node_name}");
        return Ok(Some(net.to_string()));
    }

    warn!("no pod CIDR configured for node {node_name}");
    Ok(None)
}
