//! Persistence backend trait

use async_trait::async_trait;
use wolkit_types::Device;

use crate::error::Result;

/// Durable storage for the complete device collection
///
/// Backends always read and write the whole collection; the store never
/// asks for partial updates.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Load the persisted collection
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet.
    async fn load(&self) -> Result<Option<Vec<Device>>>;

    /// Replace the persisted collection
    ///
    /// Must either fully succeed or leave the previous contents intact.
    async fn save(&self, devices: &[Device]) -> Result<()>;

    /// Human-readable location for logs
    fn describe(&self) -> String;
}
