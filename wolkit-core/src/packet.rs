//! Wake-on-LAN magic packet encoding/decoding

use bytes::{BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::trace;

use crate::{
    constants::{MAC_REPETITIONS, PACKET_SIZE, SYNC_BYTE, SYNC_LEN},
    error::{Error, Result},
    mac::MacAddress,
};

/// Wake-on-LAN magic packet
///
/// # Packet Structure
///
/// ```text
/// ┌─────────────┬──────────┬──────────┬─────┬──────────┐
/// │ Sync stream │  MAC #1  │  MAC #2  │ ... │ MAC #16  │
/// │ 6 x 0xFF    │ 6 bytes  │ 6 bytes  │     │ 6 bytes  │
/// └─────────────┴──────────┴──────────┴─────┴──────────┘
/// ```
///
/// Exactly 102 bytes. No SecureOn password, no padding.
///
/// # Examples
///
/// ```
/// use wolkit_core::{MacAddress, MagicPacket};
///
/// let mac: MacAddress = "AA:BB:CC:DD:EE:FF".parse().unwrap();
/// let packet = MagicPacket::new(mac);
/// let encoded = packet.encode();
/// assert_eq!(encoded.len(), 102);
///
/// let decoded = MagicPacket::decode(&encoded).unwrap();
/// assert_eq!(decoded.mac(), mac);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MagicPacket {
    mac: MacAddress,
}

impl MagicPacket {
    /// Total encoded size in bytes
    pub const SIZE: usize = PACKET_SIZE;

    /// Create a magic packet targeting `mac`
    pub fn new(mac: MacAddress) -> Self {
        Self { mac }
    }

    /// Target hardware address
    pub fn mac(&self) -> MacAddress {
        self.mac
    }

    /// Encode packet to bytes
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(Self::SIZE);
        let octets = self.mac.octets();

        buf.put_bytes(SYNC_BYTE, SYNC_LEN);
        for _ in 0..MAC_REPETITIONS {
            buf.put_slice(&octets);
        }

        trace!(mac = %self.mac, len = buf.len(), "Encoded magic packet");

        buf.freeze()
    }

    /// Decode and verify a magic packet
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Buffer is not exactly 102 bytes
    /// - The first 6 bytes are not all `0xFF`
    /// - Any of the 16 MAC repetitions differs from the first
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() != Self::SIZE {
            return Err(Error::InvalidPacketLength {
                expected: Self::SIZE,
                actual: buf.len(),
            });
        }

        let (sync, body) = buf.split_at(SYNC_LEN);
        if sync.iter().any(|&b| b != SYNC_BYTE) {
            return Err(Error::MissingSyncStream);
        }

        let mut octets = [0u8; 6];
        octets.copy_from_slice(&body[..MacAddress::LEN]);

        for (index, chunk) in body.chunks_exact(MacAddress::LEN).enumerate() {
            if chunk != octets {
                return Err(Error::InconsistentRepetition { index });
            }
        }

        Ok(Self::new(MacAddress::new(octets)))
    }
}

impl fmt::Debug for MagicPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MagicPacket")
            .field("mac", &self.mac.to_string())
            .field("size", &Self::SIZE)
            .finish()
    }
}

impl fmt::Display for MagicPacket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MagicPacket[{}](len={})", self.mac, Self::SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mac(s: &str) -> MacAddress {
        s.parse().unwrap()
    }

    #[test]
    fn test_packet_size_constant() {
        assert_eq!(MagicPacket::SIZE, 102);
        assert_eq!(MagicPacket::SIZE, SYNC_LEN + MAC_REPETITIONS * MacAddress::LEN);
    }

    #[test]
    fn test_packet_bytes_exact() {
        let encoded = MagicPacket::new(mac("AA:BB:CC:DD:EE:FF")).encode();

        let mut expected = vec![0xFF; 6];
        for _ in 0..16 {
            expected.extend_from_slice(&[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        }

        assert_eq!(encoded.len(), 102);
        assert_eq!(encoded.as_ref(), expected.as_slice());
    }

    #[test]
    fn test_packet_layout_for_zero_mac() {
        let encoded = MagicPacket::new(MacAddress::new([0; 6])).encode();

        assert_eq!(&encoded[..6], &[0xFF; 6]);
        assert!(encoded[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_decode_accepts_encoded() {
        let packet = MagicPacket::new(mac("01:23:45:67:89:AB"));
        let decoded = MagicPacket::decode(&packet.encode()).unwrap();
        assert_eq!(decoded, packet);
    }

    #[test]
    fn test_decode_wrong_length() {
        let mut encoded = MagicPacket::new(mac("01:23:45:67:89:AB")).encode().to_vec();
        encoded.push(0);

        assert_eq!(
            MagicPacket::decode(&encoded),
            Err(Error::InvalidPacketLength {
                expected: 102,
                actual: 103,
            })
        );
        assert!(MagicPacket::decode(&encoded[..101]).is_err());
    }

    #[test]
    fn test_decode_missing_sync() {
        let mut encoded = MagicPacket::new(mac("01:23:45:67:89:AB")).encode().to_vec();
        encoded[3] = 0x00;

        assert_eq!(MagicPacket::decode(&encoded), Err(Error::MissingSyncStream));
    }

    #[test]
    fn test_decode_corrupted_repetition() {
        let mut encoded = MagicPacket::new(mac("01:23:45:67:89:AB")).encode().to_vec();
        // Last byte of the tenth repetition
        encoded[6 + 9 * 6 + 5] ^= 0xFF;

        assert_eq!(
            MagicPacket::decode(&encoded),
            Err(Error::InconsistentRepetition { index: 9 })
        );
    }

    #[test]
    fn test_display() {
        let packet = MagicPacket::new(mac("aa:bb:cc:dd:ee:ff"));
        assert_eq!(packet.to_string(), "MagicPacket[AA:BB:CC:DD:EE:FF](len=102)");
    }
}
