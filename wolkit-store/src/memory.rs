//! In-memory backend for tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use wolkit_types::Device;

use crate::{backend::Backend, error::*};

/// Backend that keeps the collection in process memory
///
/// Can simulate storage failures: a failing load (until cleared), or a
/// failure on the next save only.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    devices: Mutex<Option<Vec<Device>>>,
    load_failure: Mutex<Option<String>>,
    fail_next_save: AtomicBool,
    saves: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty backend (nothing persisted yet)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds `devices`
    pub fn with_devices(devices: Vec<Device>) -> Self {
        Self {
            devices: Mutex::new(Some(devices)),
            ..Self::default()
        }
    }

    /// Create a backend whose `load` always fails with `message`
    pub fn failing_load(message: impl Into<String>) -> Self {
        Self {
            load_failure: Mutex::new(Some(message.into())),
            ..Self::default()
        }
    }

    /// Let `load` succeed again
    pub fn clear_load_failure(&self) {
        *self.load_failure.lock() = None;
    }

    /// Make the next `save` fail without touching stored data
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::Release);
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }

    /// Currently persisted collection
    pub fn snapshot(&self) -> Option<Vec<Device>> {
        self.devices.lock().clone()
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn load(&self) -> Result<Option<Vec<Device>>> {
        if let Some(message) = self.load_failure.lock().clone() {
            return Err(Error::Backend(message));
        }
        Ok(self.snapshot())
    }

    async fn save(&self, devices: &[Device]) -> Result<()> {
        if self.fail_next_save.swap(false, Ordering::AcqRel) {
            return Err(Error::Backend("injected save failure".into()));
        }

        *self.devices.lock() = Some(devices.to_vec());
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
