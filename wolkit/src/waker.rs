//! Magic packet transmitter

use std::net::SocketAddr;

use tracing::{debug, info, warn};

use wolkit_core::constants::{BROADCAST_ADDR, DEFAULT_PORT};
use wolkit_core::{MacAddress, MagicPacket};
use wolkit_transport::{resolve, Transport, UdpTransport};
use wolkit_types::Device;

use crate::config::Config;
use crate::error::Result;

/// Wake-on-LAN sender
///
/// Builds the magic packet for a MAC address and sends it as one datagram.
/// Delivery is not confirmed: success means the packet reached the local
/// network stack.
///
/// # Examples
///
/// ```no_run
/// use wolkit::Waker;
///
/// #[tokio::main]
/// async fn main() -> wolkit::Result<()> {
///     let waker = Waker::new();
///
///     // Limited broadcast on port 9
///     waker.send("AA:BB:CC:DD:EE:FF", None, None).await?;
///
///     // Directed to a host on port 7
///     waker.send("AA:BB:CC:DD:EE:FF", Some("192.168.1.50"), Some(7)).await?;
///     Ok(())
/// }
/// ```
pub struct Waker {
    transport: Box<dyn Transport>,
    default_port: u16,
    broadcast_addr: String,
}

impl Waker {
    /// Create a waker using UDP with broadcast enabled
    pub fn new() -> Self {
        Self::with_transport(UdpTransport::new())
    }

    /// Create a waker on top of a custom transport
    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
            default_port: DEFAULT_PORT,
            broadcast_addr: BROADCAST_ADDR.to_string(),
        }
    }

    /// Create a UDP waker with the fallbacks from `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new()
            .with_default_port(config.default_port)
            .with_broadcast_addr(config.broadcast_addr.clone())
    }

    /// Set the port used when none is given
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Set the destination used when no target is given
    pub fn with_broadcast_addr(mut self, addr: impl Into<String>) -> Self {
        self.broadcast_addr = addr.into();
        self
    }

    /// Send a magic packet for `mac`
    ///
    /// - `target_addr`: IP literal or hostname; `None` or blank means the
    ///   broadcast address
    /// - `port`: `None` or `0` means the default port
    ///
    /// Returns the address the packet was sent to.
    ///
    /// # Errors
    ///
    /// - invalid MAC ([`ErrorKind::InvalidMac`](crate::ErrorKind::InvalidMac))
    /// - target cannot be resolved
    ///   ([`ErrorKind::AddressResolution`](crate::ErrorKind::AddressResolution))
    /// - socket or send failure
    ///   ([`ErrorKind::Transmission`](crate::ErrorKind::Transmission))
    pub async fn send(
        &self,
        mac: &str,
        target_addr: Option<&str>,
        port: Option<u16>,
    ) -> Result<SocketAddr> {
        let mac = MacAddress::parse(mac)?;
        if mac.is_broadcast() {
            warn!("Sending magic packet for broadcast MAC {}, no single host will match", mac);
        }
        let packet = MagicPacket::new(mac);

        let host = target_addr
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(self.broadcast_addr.as_str());
        let port = port.filter(|&p| p != 0).unwrap_or(self.default_port);

        let dest = resolve(host, port).await?;
        debug!("Resolved target {}:{} to {}", host, port, dest);

        self.transport.send_to(&packet.encode(), dest).await?;

        info!(
            "Magic packet for {} sent to {} via {}",
            mac,
            dest,
            self.transport.name()
        );

        Ok(dest)
    }

    /// Send a magic packet using a stored device's MAC, target and port
    pub async fn wake(&self, device: &Device) -> Result<SocketAddr> {
        debug!("Waking {}", device);
        self.send(&device.mac, device.target_addr.as_deref(), device.port)
            .await
    }
}

impl Default for Waker {
    fn default() -> Self {
        Self::new()
    }
}
