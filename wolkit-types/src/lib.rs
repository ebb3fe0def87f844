//! Type definitions for wolkit

pub mod device;
pub mod error;

pub use device::{Device, DeviceDraft};
pub use error::{Error, Result};
