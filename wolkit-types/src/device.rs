//! Device records

use std::fmt;
use std::net::{IpAddr, Ipv6Addr};

use serde::{Deserialize, Serialize};
use wolkit_core::MacAddress;

use crate::error::{Error, Result};

/// Stored device record
///
/// Serialized with the field names the front-end uses
/// (`id`, `name`, `mac`, `targetAddr`, `port`); absent optionals are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Store-assigned identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Hardware address, canonical form once stored
    pub mac: String,

    /// Destination host or broadcast address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_addr: Option<String>,

    /// Destination UDP port
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl Device {
    /// Re-validate and normalize every field except `id`
    pub fn validate(self) -> Result<Self> {
        let id = self.id.clone();
        DeviceDraft::from(self).validate().map(|draft| draft.into_device(id))
    }

    /// Parsed hardware address
    pub fn mac_address(&self) -> Result<MacAddress> {
        Ok(MacAddress::parse(&self.mac)?)
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device[{}: {} ({})]", self.id, self.name, self.mac)
    }
}

/// Device fields as supplied by the user, before an id is assigned
///
/// # Examples
///
/// ```
/// use wolkit_types::DeviceDraft;
///
/// let draft = DeviceDraft::new("NAS", "aa-bb-cc-dd-ee-ff")
///     .with_target("192.168.1.255")
///     .with_port(7)
///     .validate()
///     .unwrap();
///
/// assert_eq!(draft.mac, "AA:BB:CC:DD:EE:FF");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDraft {
    pub name: String,

    pub mac: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_addr: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

impl DeviceDraft {
    /// Create a draft with name and MAC only
    pub fn new(name: impl Into<String>, mac: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mac: mac.into(),
            target_addr: None,
            port: None,
        }
    }

    /// Set destination host or broadcast address
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_addr = Some(target.into());
        self
    }

    /// Set destination port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Validate and normalize
    ///
    /// - `name` is trimmed and must not be empty
    /// - `mac` must parse and is rewritten in canonical form
    /// - blank `target_addr` becomes `None`; otherwise it must be an IP
    ///   literal or a syntactically valid hostname
    /// - `port`, when present, must not be 0
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] naming the first offending field.
    pub fn validate(self) -> Result<Self> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(Error::Validation("name must not be empty".into()));
        }

        let mac = MacAddress::normalize(&self.mac)?;
        let target_addr = normalize_target(self.target_addr)?;

        if self.port == Some(0) {
            return Err(Error::Validation("port must be in range 1-65535".into()));
        }

        Ok(Self {
            name: name.to_string(),
            mac,
            target_addr,
            port: self.port,
        })
    }

    /// Attach an id, producing a record
    pub fn into_device(self, id: impl Into<String>) -> Device {
        Device {
            id: id.into(),
            name: self.name,
            mac: self.mac,
            target_addr: self.target_addr,
            port: self.port,
        }
    }
}

impl From<Device> for DeviceDraft {
    fn from(device: Device) -> Self {
        Self {
            name: device.name,
            mac: device.mac,
            target_addr: device.target_addr,
            port: device.port,
        }
    }
}

fn normalize_target(target: Option<String>) -> Result<Option<String>> {
    let Some(raw) = target else {
        return Ok(None);
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    if trimmed.parse::<IpAddr>().is_ok() {
        return Ok(Some(trimmed.to_string()));
    }

    // Bracketed IPv6 literal, as written in URLs
    if let Some(inner) = trimmed.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        if inner.parse::<Ipv6Addr>().is_ok() {
            return Ok(Some(inner.to_string()));
        }
    }

    if is_valid_hostname(trimmed) {
        return Ok(Some(trimmed.to_ascii_lowercase()));
    }

    Err(Error::Validation(format!(
        "target address '{}' is neither an IP address nor a hostname",
        trimmed
    )))
}

/// RFC 1123 hostname syntax (a single trailing dot is allowed)
fn is_valid_hostname(host: &str) -> bool {
    let host = host.strip_suffix('.').unwrap_or(host);
    if host.is_empty() || host.len() > 253 {
        return false;
    }

    host.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
