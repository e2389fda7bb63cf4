use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use ipnetwork::IpNetwork;
use log::{debug, info};
use serde_json::{Map, Value};

use crate::cidr::parse_cidr;
use crate::error::PodCidrError;

/// Where the `ipam` object sits inside a CNI document.
///
/// A document is either a single network config with `ipam` at top level,
/// or a config list whose `plugins` array holds exactly one ipam-bearing
/// entry (conventionally the bridge plugin). The shape is decided from the
/// document content, not the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpamLocation {
    SingleConfig,
    ListConfig(usize),
}

/// Find the ipam-bearing plugin, regardless of document shape.
/// Serves both the read and the write path.
pub fn locate_ipam(doc: &Value) -> Option<IpamLocation> {
    if let Some(plugins) = doc.get("plugins").and_then(Value::as_array) {
        return plugins
            .iter()
            .position(|p| p.get("ipam").is_some_and(Value::is_object))
            .map(IpamLocation::ListConfig);
    }
    doc.get("ipam")
        .is_some_and(Value::is_object)
        .then_some(IpamLocation::SingleConfig)
}

fn ipam_object(doc: &Value, loc: IpamLocation) -> Option<&Map<String, Value>> {
    let ipam = match loc {
        IpamLocation::SingleConfig => doc.get("ipam")?,
        IpamLocation::ListConfig(idx) => doc.get("plugins")?.get(idx)?.get("ipam")?,
    };
    ipam.as_object()
}

fn ipam_object_mut(doc: &mut Value, loc: IpamLocation) -> Option<&mut Map<String, Value>> {
    let ipam = match loc {
        IpamLocation::SingleConfig => doc.get_mut("ipam")?,
        IpamLocation::ListConfig(idx) => doc.get_mut("plugins")?.get_mut(idx)?.get_mut("ipam")?,
    };
    ipam.as_object_mut()
}

fn load_doc(path: &Path) -> Result<(String, Value), PodCidrError> {
    let raw = fs::read_to_string(path).map_err(|e| PodCidrError::SpecRead {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    let doc = serde_json::from_str(&raw).map_err(|e| PodCidrError::SpecRead {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    Ok((raw, doc))
}

/// Read the pod subnet out of the CNI spec at `path`.
///
/// Returns `Ok(None)` when the document has no ipam object or its ipam
/// object has no `subnet` string; absence is not a read failure. A subnet
/// that is present but malformed surfaces [`PodCidrError::InvalidCidr`].
pub fn extract_subnet<P: AsRef<Path>>(path: P) -> Result<Option<IpNetwork>, PodCidrError> {
    let path = path.as_ref();
    let (_, doc) = load_doc(path)?;

    let subnet = locate_ipam(&doc)
        .and_then(|loc| ipam_object(&doc, loc))
        .and_then(|ipam| ipam.get("subnet"))
        .and_then(Value::as_str);

    match subnet {
        Some(s) => {
            let net = parse_cidr(s)?;
            debug!("CNI spec {} carries subnet {net}", path.display());
            Ok(Some(net))
        }
        None => {
            debug!("CNI spec {} has no subnet yet", path.display());
            Ok(None)
        }
    }
}

/// Set `ipam.subnet` in the CNI spec at `path`, touching nothing else.
///
/// The subnet key is inserted at the front of the ipam object when absent
/// and overwritten in place when present; every other field, plugin entry
/// and key position round-trips unchanged. The document on disk is
/// replaced atomically, so a concurrent reader never sees a partial spec.
/// Fails with [`PodCidrError::SpecWrite`] when the document has no ipam
/// object at all; a plugin entry is never fabricated.
pub fn insert_subnet<P: AsRef<Path>>(path: P, cidr: &str) -> Result<(), PodCidrError> {
    let path = path.as_ref();
    let (raw, mut doc) = load_doc(path)?;

    let ipam = match locate_ipam(&doc) {
        Some(loc) => {
            debug!("patching {loc:?} ipam in {}", path.display());
            ipam_object_mut(&mut doc, loc)
        }
        None => None,
    };
    let Some(ipam) = ipam else {
        return Err(PodCidrError::SpecWrite {
            path: path.to_path_buf(),
            source: anyhow!("no ipam section to attach a subnet to"),
        });
    };

    let value = Value::String(cidr.to_string());
    if ipam.contains_key("subnet") {
        ipam.insert("subnet".to_string(), value);
    } else {
        ipam.shift_insert(0, "subnet".to_string(), value);
    }

    let mut contents = serde_json::to_string(&doc).map_err(|e| PodCidrError::SpecWrite {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    if raw.ends_with('\n') {
        contents.push('\n');
    }

    write_atomic(path, &contents).map_err(|e| PodCidrError::SpecWrite {
        path: path.to_path_buf(),
        source: e,
    })?;

    info!("inserted subnet {cidr} into CNI spec {}", path.display());
    Ok(())
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let (dir, name) = (
        path.parent().context("Missing parent directory")?,
        path.file_name().context("Missing file name")?,
    );

    let temp_file = dir.join(format!(".{}", name.to_string_lossy()));
    fs::write(&temp_file, contents)?;
    fs::rename(&temp_file, path)?;

    Ok(())
}
