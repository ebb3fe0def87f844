//! # wolkit-core
//!
//! Core Wake-on-LAN primitives.
//!
//! This crate provides the low-level pieces shared by the other crates:
//! - MAC address parsing and canonical formatting
//! - Magic packet encoding/decoding
//! - Protocol constants

pub mod constants;
pub mod error;
pub mod mac;
pub mod packet;

pub use error::{Error, Result};
pub use mac::MacAddress;
pub use packet::MagicPacket;
