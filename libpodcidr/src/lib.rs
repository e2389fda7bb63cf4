pub mod cidr;
pub mod cnispec;
pub mod error;
pub mod node;

// re-export selected public API
pub use cidr::parse_cidr;
pub use cnispec::{IpamLocation, extract_subnet, insert_subnet, locate_ipam};
pub use error::PodCidrError;
pub use node::{
    Node, NodeSpec, NodeStore, ObjectMeta, POD_CIDR_ANNOTATION, XlineNodeStore, resolve_node_cidr,
};
