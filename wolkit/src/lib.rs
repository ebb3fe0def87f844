//! # wolkit
//!
//! Device registry and Wake-on-LAN sender.
//!
//! ## Features
//!
//! - Persisted device list with validation and atomic commits
//! - Magic packet construction and UDP broadcast/unicast delivery
//! - Async/await API using Tokio
//! - Stable error kinds for front-ends
//!
//! ## Quick Start
//!
//! ```no_run
//! use wolkit::{Commands, Config, DeviceDraft};
//!
//! #[tokio::main]
//! async fn main() -> wolkit::Result<()> {
//!     let commands = Commands::open(&Config::default()).await?;
//!
//!     // Register a device
//!     let devices = commands
//!         .add_device(DeviceDraft::new("Desktop", "aa-bb-cc-dd-ee-ff"))
//!         .await?;
//!
//!     // Wake it
//!     commands.wake_device(&devices[0].id).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod waker;

// Re-exports
pub use commands::{Commands, Loaded};
pub use config::Config;
pub use error::{Error, ErrorKind, ErrorReport, Result};
pub use waker::Waker;

// Re-export types
pub use wolkit_core::{MacAddress, MagicPacket};
pub use wolkit_store::{Backend, DeviceStore, FileBackend, MemoryBackend};
pub use wolkit_transport::{Transport, UdpTransport};
pub use wolkit_types::{Device, DeviceDraft};
