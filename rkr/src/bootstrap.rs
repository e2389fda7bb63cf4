use anyhow::{Context, Result, bail};
use libpodcidr::{
    NodeStore, POD_CIDR_ANNOTATION, extract_subnet, insert_subnet, parse_cidr, resolve_node_cidr,
};
use log::info;

use crate::config::Config;

/// Resolve the pod CIDR for this node and make sure the CNI spec on disk
/// carries it. Runs once at startup; any failure aborts the agent, since
/// route programming downstream needs a known CIDR.
pub async fn run(cfg: &Config, store: &dyn NodeStore) -> Result<()> {
    let cidr = resolve_node_cidr(store, &cfg.node_name, cfg.pod_cidr.as_deref())
        .await
        .context("failed to resolve pod CIDR")?;

    let Some(cidr) = cidr else {
        bail!(
            "no pod CIDR configured for node {}: set spec.podCIDR, the {POD_CIDR_ANNOTATION} annotation, or pod_cidr in the agent config",
            cfg.node_name
        );
    };
    let desired = parse_cidr(&cidr).context("resolved pod CIDR failed validation")?;

    let current = extract_subnet(&cfg.cni_conf_path)
        .with_context(|| format!("failed to read current subnet from {}", cfg.cni_conf_path))?;

    if current == Some(desired) {
        info!(
            "CNI spec {} already carries pod CIDR {cidr}, nothing to patch",
            cfg.cni_conf_path
        );
        return Ok(());
    }

    insert_subnet(&cfg.cni_conf_path, &cidr)
        .with_context(|| format!("failed to patch CNI spec {}", cfg.cni_conf_path))?;
    info!("patched CNI spec {} with pod CIDR {cidr}", cfg.cni_conf_path);

    Ok(())
}
