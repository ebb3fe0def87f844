//! Application configuration
//!
//! Loaded from an optional TOML file; every field has a default so a
//! missing file or a partial one both work:
//!
//! ```toml
//! data_dir = "/var/lib/wolkit"
//! storage_timeout_secs = 5
//! default_port = 9
//! broadcast_addr = "192.168.1.255"
//! ```
//!
//! The default data directory is platform specific:
//! - Linux:    `$XDG_CONFIG_HOME/wolkit` or `~/.config/wolkit`
//! - Windows:  `%APPDATA%\wolkit`
//! - macOS:    `~/Library/Application Support/wolkit`

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wolkit_core::constants::{BROADCAST_ADDR, DEFAULT_PORT, DEFAULT_STORAGE_TIMEOUT, DEVICES_FILE};

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `devices.json`
    pub data_dir: PathBuf,

    /// Bound on each storage read/write
    pub storage_timeout_secs: u64,

    /// Port used when neither the call nor the device gives one
    pub default_port: u16,

    /// Destination used when no target address is given
    pub broadcast_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: platform_data_dir().unwrap_or_else(|| PathBuf::from(".")),
            storage_timeout_secs: DEFAULT_STORAGE_TIMEOUT,
            default_port: DEFAULT_PORT,
            broadcast_addr: BROADCAST_ADDR.to_string(),
        }
    }
}

impl Config {
    /// Load from a TOML file, falling back to defaults if it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        match std::fs::read_to_string(path) {
            Ok(content) => {
                debug!("Loaded config from {:?}", path);
                Self::from_toml_str(&content)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(Error::Config(format!("{}: {}", path.display(), e))),
        }
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field ranges
    pub fn validate(&self) -> Result<()> {
        if self.default_port == 0 {
            return Err(Error::Config("default_port must be in range 1-65535".into()));
        }

        if self.storage_timeout_secs == 0 {
            return Err(Error::Config("storage_timeout_secs must be at least 1".into()));
        }

        if self.broadcast_addr.parse::<IpAddr>().is_err() {
            return Err(Error::Config(format!(
                "broadcast_addr '{}' is not an IP address",
                self.broadcast_addr
            )));
        }

        Ok(())
    }

    /// Set data directory
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Set storage timeout (rounded down to whole seconds, minimum 1)
    pub fn with_storage_timeout(mut self, timeout: Duration) -> Self {
        self.storage_timeout_secs = timeout.as_secs().max(1);
        self
    }

    /// Set fallback port
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Set fallback destination
    pub fn with_broadcast_addr(mut self, addr: impl Into<String>) -> Self {
        self.broadcast_addr = addr.into();
        self
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_secs(self.storage_timeout_secs)
    }

    /// Full path of the device file
    pub fn devices_path(&self) -> PathBuf {
        self.data_dir.join(DEVICES_FILE)
    }
}

/// Platform config directory for the application, if it can be determined
pub fn platform_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("wolkit"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("wolkit")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("wolkit"))
    }
}
