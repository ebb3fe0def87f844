//! Transport layer for Wake-on-LAN
//!
//! Resolves destinations and sends magic packets as single UDP datagrams.

pub mod error;
pub mod resolve;
pub mod udp;

pub use error::{Error, Result};
pub use resolve::resolve;
pub use udp::UdpTransport;

use std::net::SocketAddr;

use async_trait::async_trait;

/// Datagram transport
///
/// Implementations send one datagram and return once it has been handed
/// to the network stack. No reply is expected.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `payload` as a single datagram to `dest`
    async fn send_to(&self, payload: &[u8], dest: SocketAddr) -> Result<()>;

    /// Short transport name for logs
    fn name(&self) -> &'static str;
}
