use ipnetwork::IpNetwork;

use crate::error::PodCidrError;

/// Parse and validate a pod CIDR string.
///
/// The input must be in `address/prefix` form and the address must be the
/// network address under that prefix, with no host bits set. A bare address
/// such as `172.17.0.0` is rejected rather than read as a host route, and a
/// misaligned address such as `172.17.0.1/24` is rejected rather than
/// silently masked.
pub fn parse_cidr(s: &str) -> Result<IpNetwork, PodCidrError> {
    if !s.contains('/') {
        return Err(PodCidrError::InvalidCidr(s.to_string()));
    }

    let net: IpNetwork = s
        .parse()
        .map_err(|_| PodCidrError::InvalidCidr(s.to_string()))?;

    if net.ip() != net.network() {
        return Err(PodCidrError::InvalidCidr(s.to_string()));
    }

    Ok(net)
}
