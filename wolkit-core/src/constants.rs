//! Protocol constants

use std::net::Ipv4Addr;

/// Byte value of the synchronization stream
pub const SYNC_BYTE: u8 = 0xFF;

/// Length of the synchronization stream
pub const SYNC_LEN: usize = 6;

/// Number of times the target MAC is repeated
pub const MAC_REPETITIONS: usize = 16;

/// Magic packet size (6 sync bytes + 16 MAC repetitions)
pub const PACKET_SIZE: usize = 102;

/// Conventional Wake-on-LAN UDP port (discard service)
pub const DEFAULT_PORT: u16 = 9;

/// Limited broadcast address used when no target is given
pub const BROADCAST_ADDR: Ipv4Addr = Ipv4Addr::BROADCAST;

/// Default storage I/O timeout (seconds)
pub const DEFAULT_STORAGE_TIMEOUT: u64 = 5;

/// File name of the persisted device collection
pub const DEVICES_FILE: &str = "devices.json";
