//! UDP transport for magic packets
//!
//! Every send binds a fresh socket, enables broadcast for IPv4 and sends a
//! single datagram. The socket is closed when it goes out of scope, on the
//! error paths as well.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use async_trait::async_trait;
use tokio::net::UdpSocket;
use tracing::{debug, trace, warn};

use crate::{error::*, Transport};

/// Connectionless UDP transport
#[derive(Debug, Clone)]
pub struct UdpTransport {
    broadcast: bool,
}

impl UdpTransport {
    /// Create new UDP transport with broadcast enabled
    pub fn new() -> Self {
        Self { broadcast: true }
    }

    /// Enable or disable `SO_BROADCAST` on IPv4 sockets
    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }

    fn bind_addr(dest: SocketAddr) -> SocketAddr {
        match dest {
            SocketAddr::V4(_) => SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0)),
            SocketAddr::V6(_) => SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0)),
        }
    }
}

impl Default for UdpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for UdpTransport {
    async fn send_to(&self, payload: &[u8], dest: SocketAddr) -> Result<()> {
        let socket = UdpSocket::bind(Self::bind_addr(dest))
            .await
            .map_err(Error::Io)?;

        if self.broadcast && dest.is_ipv4() {
            socket.set_broadcast(true).map_err(Error::Io)?;
        }

        trace!(
            "Sending {} bytes via UDP to {}: {:02X?}",
            payload.len(),
            dest,
            &payload[..payload.len().min(32)]
        );

        let sent = socket.send_to(payload, dest).await.map_err(|e| {
            warn!("Send to {} failed: {}", dest, e);
            Error::Io(e)
        })?;

        if sent != payload.len() {
            return Err(Error::ShortWrite {
                sent,
                expected: payload.len(),
            });
        }

        debug!("Sent {} bytes via UDP to {}", sent, dest);

        Ok(())
    }

    fn name(&self) -> &'static str {
        "udp"
    }
}
