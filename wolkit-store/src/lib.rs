//! Persistent device registry
//!
//! [`DeviceStore`] owns the ordered device collection and commits every
//! mutation through a [`Backend`] before it becomes visible:
//!
//! ```text
//! validate -> mutate copy -> backend.save(copy) -> swap in-memory state
//! ```
//!
//! Backends:
//! - [`FileBackend`] - pretty-printed JSON file, replaced atomically
//! - [`MemoryBackend`] - in-process, for tests

pub mod backend;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use backend::Backend;
pub use error::{Error, Result};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use store::{DeviceStore, Listing};
