use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Deserialize)]
pub struct Config {
    // Name this node is registered under in the cluster store
    pub node_name: String,
    // CNI conf or conflist kept in sync with the resolved pod CIDR
    pub cni_conf_path: String,
    // Pre-validated CIDR override; set it to skip the node lookup
    #[serde(default)]
    pub pod_cidr: Option<String>,
    // Xline endpoints
    pub xline_config: XlineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct XlineConfig {
    pub endpoints: Vec<String>,
}

pub fn load_config(path: &str) -> Result<Config> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read config from {path}"))?;
    let cfg: Config = serde_yaml::from_str(&content).context("Failed to parse YAML config")?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(
            file,
            r#"
node_name: test-node
cni_conf_path: /etc/cni/net.d/10-rkr.conf
xline_config:
  endpoints:
    - "http://127.0.0.1:2379"
"#
        )
        .expect("Failed to write to temp file");

        let cfg = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.node_name, "test-node");
        assert_eq!(cfg.cni_conf_path, "/etc/cni/net.d/10-rkr.conf");
        assert!(cfg.pod_cidr.is_none());
        assert_eq!(cfg.xline_config.endpoints, vec!["http://127.0.0.1:2379"]);
    }

    #[test]
    fn test_load_config_with_override() {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        write!(
            file,
            r#"
node_name: test-node
cni_conf_path: /etc/cni/net.d/10-rkr.conflist
pod_cidr: 10.244.1.0/24
xline_config:
  endpoints:
    - "http://127.0.0.1:2379"
    - "http://127.0.0.2:2379"
"#
        )
        .expect("Failed to write to temp file");

        let cfg = load_config(file.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.pod_cidr.as_deref(), Some("10.244.1.0/24"));
        assert_eq!(cfg.xline_config.endpoints.len(), 2);
    }
}
