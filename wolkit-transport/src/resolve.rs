//! Destination address resolution

use std::net::{IpAddr, SocketAddr};

use tracing::debug;

use crate::error::*;

/// Resolve a host (IP literal or hostname) and port to a socket address
///
/// IP literals (including bracketed IPv6) are used as is. Hostnames go
/// through the system resolver; an IPv4 result is preferred since magic
/// packets are usually sent over IPv4 broadcast.
///
/// # Errors
///
/// Returns [`Error::InvalidAddress`] if the lookup fails or yields nothing.
pub async fn resolve(host: &str, port: u16) -> Result<SocketAddr> {
    let host = host.trim();
    let bare = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    if let Ok(ip) = bare.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, port));
    }

    if bare.is_empty() {
        return Err(Error::InvalidAddress("empty host".into()));
    }

    debug!("Resolving {}...", bare);

    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((bare, port))
        .await
        .map_err(|e| Error::InvalidAddress(format!("{}: {}", bare, e)))?
        .collect();

    let addr = addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| Error::InvalidAddress(format!("No addresses found for {}", bare)))?;

    debug!("Resolved {} to {}", bare, addr);

    Ok(addr)
}
