//! Command surface for a front-end
//!
//! One [`Commands`] is built at startup and shared (by reference or `Arc`)
//! with whatever drives the UI. Each method is an independent command;
//! a failure in one never affects the state seen by the next.

use std::sync::Arc;

use tracing::{info, warn};

use wolkit_store::{DeviceStore, FileBackend};
use wolkit_types::{Device, DeviceDraft};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::waker::Waker;

/// Result of [`Commands::load_devices`]
///
/// When storage could not be read, `devices` is empty and `error` says why.
#[derive(Debug)]
pub struct Loaded {
    pub devices: Vec<Device>,
    pub error: Option<Error>,
}

/// Device registry plus Wake-on-LAN sender
pub struct Commands {
    store: DeviceStore,
    waker: Waker,
}

impl Commands {
    /// Open the file-backed registry under `config.data_dir`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration is invalid. Unreadable
    /// storage is not an error here; it is reported by
    /// [`load_devices`](Self::load_devices).
    pub async fn open(config: &Config) -> Result<Self> {
        config.validate()?;

        let backend = FileBackend::in_dir(&config.data_dir);
        info!("Opening device registry at {:?}", backend.path());

        let store = DeviceStore::open_with_timeout(Arc::new(backend), config.storage_timeout()).await;

        Ok(Self::new(store, Waker::from_config(config)))
    }

    /// Assemble from an existing store and waker
    pub fn new(store: DeviceStore, waker: Waker) -> Self {
        Self { store, waker }
    }

    /// Underlying store
    pub fn store(&self) -> &DeviceStore {
        &self.store
    }

    /// List all devices in insertion order
    pub async fn load_devices(&self) -> Loaded {
        info!("Executing load_devices command...");

        let listing = self.store.list().await;
        let error = listing.error.map(Error::from);
        if let Some(e) = &error {
            warn!("Error loading devices: {}", e);
        }

        Loaded {
            devices: listing.devices,
            error,
        }
    }

    /// Add a device; any id on the input is ignored
    pub async fn add_device(&self, device: impl Into<DeviceDraft>) -> Result<Vec<Device>> {
        let draft = device.into();
        info!("Executing add_device command for: {}", draft.name);

        report("add_device", self.store.add(draft).await.map_err(Error::from))
    }

    /// Replace an existing device
    pub async fn update_device(&self, device: Device) -> Result<Vec<Device>> {
        info!("Executing update_device command for: {}", device.id);

        report("update_device", self.store.update(device).await.map_err(Error::from))
    }

    /// Remove a device
    pub async fn delete_device(&self, device_id: &str) -> Result<Vec<Device>> {
        info!("Executing delete_device command for ID: {}", device_id);

        report("delete_device", self.store.delete(device_id).await.map_err(Error::from))
    }

    /// Send a magic packet
    pub async fn send_wol_packet(
        &self,
        mac_address: &str,
        target_addr: Option<&str>,
        port: Option<u16>,
    ) -> Result<()> {
        info!("Executing send_wol_packet command for MAC: {}", mac_address);

        let sent = self.waker.send(mac_address, target_addr, port).await;
        report("send_wol_packet", sent.map(|_| ()))
    }

    /// Send a magic packet to a stored device
    pub async fn wake_device(&self, device_id: &str) -> Result<()> {
        info!("Executing wake_device command for ID: {}", device_id);

        let result = match self.store.get(device_id).await {
            Some(device) => self.waker.wake(&device).await.map(|_| ()),
            None => Err(wolkit_store::Error::NotFound(device_id.to_string()).into()),
        };
        report("wake_device", result)
    }
}

fn report<T>(command: &str, result: Result<T>) -> Result<T> {
    if let Err(e) = &result {
        warn!(command = command, kind = ?e.kind(), "Command failed: {}", e);
    }
    result
}
