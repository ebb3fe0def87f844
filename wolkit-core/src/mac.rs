//! MAC address parsing and canonical formatting
//!
//! Accepted input is the standard six-group notation with a single delimiter,
//! either `:` or `-`, two hex digits per group, any case:
//!
//! ```text
//! AA:BB:CC:DD:EE:FF
//! aa-bb-cc-dd-ee-ff
//! ```
//!
//! The canonical form is upper-case and colon-delimited.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::trace;

use crate::error::{Error, Result};

/// Six-octet hardware address
///
/// # Examples
///
/// ```
/// use wolkit_core::MacAddress;
///
/// let mac: MacAddress = "aa-bb-cc-dd-ee-ff".parse().unwrap();
/// assert_eq!(mac.to_string(), "AA:BB:CC:DD:EE:FF");
/// assert_eq!(mac.octets(), [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MacAddress([u8; 6]);

impl MacAddress {
    /// Number of octets in a MAC address
    pub const LEN: usize = 6;

    /// Create from raw octets
    pub const fn new(octets: [u8; 6]) -> Self {
        Self(octets)
    }

    /// Raw octets
    pub const fn octets(&self) -> [u8; 6] {
        self.0
    }

    /// Parse a delimited MAC address string
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMac`] if:
    /// - No `:`/`-` delimiter is present, or both are mixed
    /// - There are not exactly 6 groups
    /// - A group is not exactly two hex digits
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();

        let delimiter = match (trimmed.contains(':'), trimmed.contains('-')) {
            (true, false) => ':',
            (false, true) => '-',
            (true, true) => return Err(Error::invalid_mac(input, "mixed ':' and '-' delimiters")),
            (false, false) => {
                return Err(Error::invalid_mac(input, "expected ':' or '-' delimited octets"));
            }
        };

        let groups: Vec<&str> = trimmed.split(delimiter).collect();
        if groups.len() != Self::LEN {
            return Err(Error::invalid_mac(
                input,
                format!("expected {} octets, found {}", Self::LEN, groups.len()),
            ));
        }

        let mut octets = [0u8; 6];
        for (octet, group) in octets.iter_mut().zip(&groups) {
            if group.len() != 2 {
                return Err(Error::invalid_mac(
                    input,
                    format!("octet '{}' must be two hex digits", group),
                ));
            }

            let mut byte = [0u8; 1];
            hex::decode_to_slice(group, &mut byte).map_err(|_| {
                Error::invalid_mac(input, format!("octet '{}' is not hexadecimal", group))
            })?;
            *octet = byte[0];
        }

        let mac = Self(octets);
        trace!(input = input, canonical = %mac, "Parsed MAC address");

        Ok(mac)
    }

    /// Normalize a MAC address string to its canonical form
    ///
    /// ```
    /// use wolkit_core::MacAddress;
    ///
    /// assert_eq!(MacAddress::normalize("0a-1b-2c-3d-4e-5f").unwrap(), "0A:1B:2C:3D:4E:5F");
    /// ```
    pub fn normalize(input: &str) -> Result<String> {
        Self::parse(input).map(|mac| mac.to_string())
    }

    /// Check if this is the broadcast hardware address
    pub fn is_broadcast(&self) -> bool {
        self.0 == [0xFF; 6]
    }
}

impl FromStr for MacAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02X}:{b:02X}:{c:02X}:{d:02X}:{e:02X}:{g:02X}")
    }
}

impl fmt::Debug for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MacAddress({})", self)
    }
}

impl Serialize for MacAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MacAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
