use std::path::PathBuf;

/// Failures surfaced by pod CIDR resolution and CNI spec patching.
///
/// None of these are retried internally; callers own any retry policy.
#[derive(Debug, thiserror::Error)]
pub enum PodCidrError {
    /// The string is not `address/prefix`, or the address has host bits
    /// set under the prefix mask. Carries the offending input.
    #[error("invalid CIDR address: {0}")]
    InvalidCidr(String),

    /// The node store errored or the node does not exist.
    #[error("failed to look up node {node}")]
    NodeLookup {
        node: String,
        #[source]
        source: anyhow::Error,
    },

    /// The CNI spec could not be read or is not parseable at all.
    #[error("failed to read CNI spec {}", .path.display())]
    SpecRead {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// The CNI spec has no ipam section to patch, or the replacement
    /// write failed.
    #[error("failed to write CNI spec {}", .path.display())]
    SpecWrite {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}
