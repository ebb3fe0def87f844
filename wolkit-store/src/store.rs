//! Device store
//!
//! Holds the authoritative device collection in memory and commits every
//! change to the backend before swapping it in. Mutations hold the write
//! lock across validate, persist and swap, so there is at most one writer
//! and readers never observe a half-applied change.
//!
//! If the backend could not be read at open, mutations retry the load first
//! and fail while it keeps failing. Unreadable data is never overwritten.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;
use wolkit_core::constants::DEFAULT_STORAGE_TIMEOUT;
use wolkit_types::{Device, DeviceDraft};

use crate::{backend::Backend, error::*};

/// Result of [`DeviceStore::list`]
///
/// `error` is set when the backing storage could not be read at startup;
/// `devices` is then empty.
#[derive(Debug)]
pub struct Listing {
    pub devices: Vec<Device>,
    pub error: Option<Error>,
}

#[derive(Debug)]
struct State {
    devices: Vec<Device>,
    load_error: Option<String>,
}

/// Persisted, ordered collection of devices
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use wolkit_store::{DeviceStore, MemoryBackend};
/// use wolkit_types::DeviceDraft;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> wolkit_store::Result<()> {
/// let store = DeviceStore::open(Arc::new(MemoryBackend::new())).await;
///
/// let devices = store.add(DeviceDraft::new("NAS", "aa-bb-cc-dd-ee-ff")).await?;
/// assert_eq!(devices[0].mac, "AA:BB:CC:DD:EE:FF");
///
/// let devices = store.delete(&devices[0].id).await?;
/// assert!(devices.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct DeviceStore {
    backend: Arc<dyn Backend>,
    state: RwLock<State>,
    io_timeout: Duration,
}

impl DeviceStore {
    /// Open a store with the default storage timeout
    ///
    /// Never fails: unreadable storage leaves the store empty and the
    /// failure is reported by [`list`](Self::list).
    pub async fn open(backend: Arc<dyn Backend>) -> Self {
        Self::open_with_timeout(backend, Duration::from_secs(DEFAULT_STORAGE_TIMEOUT)).await
    }

    /// Open a store with a custom storage timeout
    pub async fn open_with_timeout(backend: Arc<dyn Backend>, io_timeout: Duration) -> Self {
        let location = backend.describe();
        debug!("Loading devices from {}", location);

        let state = match load_checked(backend.as_ref(), io_timeout).await {
            Ok(Some(devices)) => {
                info!("Loaded {} devices from {}", devices.len(), location);
                State {
                    devices,
                    load_error: None,
                }
            }
            Ok(None) => {
                info!("No device file at {}, starting empty", location);
                State {
                    devices: Vec::new(),
                    load_error: None,
                }
            }
            Err(e) => {
                warn!("Failed to load devices from {}: {}", location, e);
                State {
                    devices: Vec::new(),
                    load_error: Some(e.to_string()),
                }
            }
        };

        Self {
            backend,
            state: RwLock::new(state),
            io_timeout,
        }
    }

    /// All devices in insertion order
    pub async fn list(&self) -> Listing {
        let state = self.state.read().await;
        Listing {
            devices: state.devices.clone(),
            error: state.load_error.clone().map(Error::Unavailable),
        }
    }

    /// Look up a device by id
    pub async fn get(&self, id: &str) -> Option<Device> {
        let state = self.state.read().await;
        state.devices.iter().find(|d| d.id == id).cloned()
    }

    /// Number of stored devices
    pub async fn len(&self) -> usize {
        self.state.read().await.devices.len()
    }

    /// Check if the store holds no devices
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Validate `draft`, assign a fresh id and append it
    ///
    /// # Errors
    ///
    /// - [`Error::Validation`] if name or MAC is invalid
    /// - [`Error::Unavailable`] if stored devices still cannot be read
    /// - a persistence error if the collection could not be written;
    ///   the store is left unchanged
    pub async fn add(&self, draft: DeviceDraft) -> Result<Vec<Device>> {
        let draft = draft.validate()?;

        let mut state = self.state.write().await;
        self.ensure_loaded(&mut state).await?;

        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !state.devices.iter().any(|d| d.id == candidate) {
                break candidate;
            }
        };

        let device = draft.into_device(id);
        let mut next = state.devices.clone();
        next.push(device.clone());

        self.commit(&mut state, next).await?;

        info!("Device added: {} (total {})", device, state.devices.len());
        Ok(state.devices.clone())
    }

    /// Replace the device with the same id, keeping its position
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no device has `device.id`
    /// - [`Error::Validation`] if name or MAC is invalid
    /// - [`Error::Unavailable`] if stored devices still cannot be read
    /// - a persistence error if the collection could not be written
    pub async fn update(&self, device: Device) -> Result<Vec<Device>> {
        let mut state = self.state.write().await;
        self.ensure_loaded(&mut state).await?;

        let index = state
            .devices
            .iter()
            .position(|d| d.id == device.id)
            .ok_or_else(|| Error::NotFound(device.id.clone()))?;

        let device = device.validate()?;
        let mut next = state.devices.clone();
        next[index] = device.clone();

        self.commit(&mut state, next).await?;

        info!("Device updated: {}", device);
        Ok(state.devices.clone())
    }

    /// Remove the device with `id`
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if no device has `id`
    /// - [`Error::Unavailable`] if stored devices still cannot be read
    /// - a persistence error if the collection could not be written
    pub async fn delete(&self, id: &str) -> Result<Vec<Device>> {
        let mut state = self.state.write().await;
        self.ensure_loaded(&mut state).await?;

        if !state.devices.iter().any(|d| d.id == id) {
            return Err(Error::NotFound(id.to_string()));
        }

        let next: Vec<Device> = state
            .devices
            .iter()
            .filter(|d| d.id != id)
            .cloned()
            .collect();

        self.commit(&mut state, next).await?;

        info!("Device deleted: {} (total {})", id, state.devices.len());
        Ok(state.devices.clone())
    }

    /// Retry a failed initial load so a mutation never replaces data it
    /// could not read
    async fn ensure_loaded(&self, state: &mut State) -> Result<()> {
        if state.load_error.is_none() {
            return Ok(());
        }

        match load_checked(self.backend.as_ref(), self.io_timeout).await {
            Ok(devices) => {
                let devices = devices.unwrap_or_default();
                info!(
                    "Recovered {} devices from {}",
                    devices.len(),
                    self.backend.describe()
                );
                state.devices = devices;
                state.load_error = None;
                Ok(())
            }
            Err(e) => {
                warn!(
                    "Refusing to modify {}, stored devices are unreadable: {}",
                    self.backend.describe(),
                    e
                );
                let message = e.to_string();
                state.load_error = Some(message.clone());
                Err(Error::Unavailable(message))
            }
        }
    }

    async fn commit(&self, state: &mut State, next: Vec<Device>) -> Result<()> {
        let saved = match timeout(self.io_timeout, self.backend.save(&next)).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                seconds: self.io_timeout.as_secs(),
            }),
        };

        if let Err(e) = saved {
            warn!("Failed to persist devices to {}: {}", self.backend.describe(), e);
            return Err(e);
        }

        state.devices = next;
        Ok(())
    }
}

async fn load_checked(backend: &dyn Backend, io_timeout: Duration) -> Result<Option<Vec<Device>>> {
    let loaded = match timeout(io_timeout, backend.load()).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(Error::Timeout {
                seconds: io_timeout.as_secs(),
            });
        }
    };

    loaded.map(check_loaded).transpose()
}

/// Re-validate records read from storage
///
/// Non-canonical but valid fields are normalized. An invalid record or a
/// repeated id rejects the whole collection.
fn check_loaded(devices: Vec<Device>) -> Result<Vec<Device>> {
    let mut seen = HashSet::with_capacity(devices.len());
    let mut checked = Vec::with_capacity(devices.len());

    for device in devices {
        if device.id.trim().is_empty() {
            return Err(Error::Corrupt(format!("device '{}' has an empty id", device.name)));
        }
        if !seen.insert(device.id.clone()) {
            return Err(Error::Corrupt(format!("duplicate device id '{}'", device.id)));
        }

        let id = device.id.clone();
        let normalized = device
            .clone()
            .validate()
            .map_err(|e| Error::Corrupt(format!("device '{}': {}", id, e)))?;
        if normalized != device {
            warn!("Normalized stored device {}", normalized);
        }
        checked.push(normalized);
    }

    Ok(checked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    async fn open_memory() -> (Arc<MemoryBackend>, DeviceStore) {
        let backend = Arc::new(MemoryBackend::new());
        let store = DeviceStore::open(backend.clone()).await;
        (backend, store)
    }

    fn draft(name: &str, mac: &str) -> DeviceDraft {
        DeviceDraft::new(name, mac)
    }

    #[tokio::test]
    async fn test_open_empty() {
        let (_, store) = open_memory().await;
        let listing = store.list().await;

        assert!(listing.devices.is_empty());
        assert!(listing.error.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_open_existing() {
        let devices = vec![draft("pc", "AA:BB:CC:DD:EE:FF").into_device("1")];
        let store = DeviceStore::open(Arc::new(MemoryBackend::with_devices(devices.clone()))).await;

        assert_eq!(store.list().await.devices, devices);
        assert_eq!(store.get("1").await, Some(devices[0].clone()));
        assert_eq!(store.get("2").await, None);
    }

    #[tokio::test]
    async fn test_open_unreadable_degrades_to_empty() {
        let store = DeviceStore::open(Arc::new(MemoryBackend::failing_load("corrupt"))).await;
        let listing = store.list().await;

        assert!(listing.devices.is_empty());
        let error = listing.error.unwrap();
        assert!(error.is_persistence());
        assert!(error.to_string().contains("corrupt"));
    }

    #[tokio::test]
    async fn test_mutations_refused_while_unreadable() {
        let known = draft("nas", "00:11:22:33:44:55").into_device("nas");
        let failing = Arc::new(MemoryBackend::failing_load("corrupt"));
        let store = DeviceStore::open(failing.clone()).await;

        let err = store.add(draft("pc", "AA:BB:CC:DD:EE:FF")).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(ref m) if m.contains("corrupt")));
        assert!(err.is_persistence());

        let err = store.update(known).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
        assert!(matches!(store.delete("nas").await, Err(Error::Unavailable(_))));

        assert_eq!(failing.save_count(), 0);
        assert_eq!(failing.snapshot(), None);
        assert!(store.list().await.error.is_some());
    }

    #[tokio::test]
    async fn test_mutation_reloads_once_storage_is_readable() {
        let backend = Arc::new(MemoryBackend::failing_load("disk busy"));
        let store = DeviceStore::open(backend.clone()).await;
        assert!(store.list().await.error.is_some());

        backend.clear_load_failure();
        store.add(draft("pc", "AA:BB:CC:DD:EE:FF")).await.unwrap();

        let listing = store.list().await;
        assert!(listing.error.is_none());
        assert_eq!(listing.devices.len(), 1);
        assert_eq!(backend.snapshot(), Some(listing.devices));
    }

    #[tokio::test]
    async fn test_open_normalizes_stored_fields() {
        let mut stored = draft("nas", "AA:BB:CC:DD:EE:FF").into_device("1");
        stored.mac = "aa-bb-cc-dd-ee-ff".into();
        stored.name = "  nas ".into();
        let store = DeviceStore::open(Arc::new(MemoryBackend::with_devices(vec![stored]))).await;

        let listing = store.list().await;
        assert!(listing.error.is_none());
        assert_eq!(listing.devices[0].mac, "AA:BB:CC:DD:EE:FF");
        assert_eq!(listing.devices[0].name, "nas");
    }

    #[tokio::test]
    async fn test_open_rejects_invalid_stored_records() {
        let mut bad_port = draft("nas", "AA:BB:CC:DD:EE:FF").into_device("dup");
        bad_port.port = Some(0);
        let store = DeviceStore::open(Arc::new(MemoryBackend::with_devices(vec![bad_port]))).await;

        let listing = store.list().await;
        assert!(listing.devices.is_empty());
        assert!(listing.error.unwrap().to_string().contains("dup"));
    }

    #[tokio::test]
    async fn test_open_rejects_duplicate_ids() {
        let backend = Arc::new(MemoryBackend::with_devices(vec![
            draft("a", "00:00:00:00:00:01").into_device("dup"),
            draft("b", "00:00:00:00:00:02").into_device("dup"),
        ]));
        let store = DeviceStore::open(backend.clone()).await;

        let listing = store.list().await;
        assert!(listing.devices.is_empty());
        assert!(listing.error.unwrap().to_string().contains("duplicate device id 'dup'"));

        assert!(matches!(store.delete("dup").await, Err(Error::Unavailable(_))));
        assert_eq!(backend.snapshot().map(|d| d.len()), Some(2));
    }

    #[tokio::test]
    async fn test_add_assigns_id_and_normalizes() {
        let (backend, store) = open_memory().await;

        let devices = store
            .add(draft("Desktop", "aa-bb-cc-dd-ee-ff").with_target("192.168.1.50").with_port(7))
            .await
            .unwrap();

        assert_eq!(devices.len(), 1);
        let device = &devices[0];
        assert!(Uuid::parse_str(&device.id).is_ok());
        assert_eq!(device.name, "Desktop");
        assert_eq!(device.mac, "AA:BB:CC:DD:EE:FF");
        assert_eq!(device.target_addr.as_deref(), Some("192.168.1.50"));
        assert_eq!(device.port, Some(7));

        assert_eq!(store.list().await.devices, devices);
        assert_eq!(backend.snapshot(), Some(devices));
    }

    #[tokio::test]
    async fn test_add_keeps_insertion_order_and_unique_ids() {
        let (_, store) = open_memory().await;

        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            store
                .add(draft(name, &format!("00:00:00:00:00:0{}", i)))
                .await
                .unwrap();
        }

        let devices = store.list().await.devices;
        let names: Vec<&str> = devices.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c", "d"]);

        let ids: HashSet<&str> = devices.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), 4);
    }

    #[tokio::test]
    async fn test_add_invalid_leaves_store_unchanged() {
        let (backend, store) = open_memory().await;

        let err = store.add(draft("", "AA:BB:CC:DD:EE:FF")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = store.add(draft("pc", "AA:BB:CC:DD:EE")).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        assert!(store.is_empty().await);
        assert_eq!(backend.save_count(), 0);
    }

    #[tokio::test]
    async fn test_add_save_failure_leaves_store_unchanged() {
        let (backend, store) = open_memory().await;
        store.add(draft("first", "AA:BB:CC:DD:EE:FF")).await.unwrap();

        backend.fail_next_save();
        let err = store.add(draft("second", "00:11:22:33:44:55")).await.unwrap_err();
        assert!(err.is_persistence());

        let devices = store.list().await.devices;
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "first");
        assert_eq!(backend.snapshot(), Some(devices));
    }

    #[tokio::test]
    async fn test_update_in_place() {
        let (_, store) = open_memory().await;
        store.add(draft("a", "00:00:00:00:00:01")).await.unwrap();
        store.add(draft("b", "00:00:00:00:00:02")).await.unwrap();
        let devices = store.add(draft("c", "00:00:00:00:00:03")).await.unwrap();

        let mut changed = devices[1].clone();
        changed.name = "renamed".into();
        changed.mac = "de-ad-be-ef-00-02".into();
        changed.port = Some(7);

        let updated = store.update(changed.clone()).await.unwrap();

        assert_eq!(updated.len(), 3);
        assert_eq!(updated[0], devices[0]);
        assert_eq!(updated[1].id, devices[1].id);
        assert_eq!(updated[1].name, "renamed");
        assert_eq!(updated[1].mac, "DE:AD:BE:EF:00:02");
        assert_eq!(updated[1].port, Some(7));
        assert_eq!(updated[2], devices[2]);
    }

    #[tokio::test]
    async fn test_update_unknown_id() {
        let (backend, store) = open_memory().await;
        let before = store.add(draft("a", "00:00:00:00:00:01")).await.unwrap();

        let ghost = draft("ghost", "00:00:00:00:00:09").into_device("missing");
        let err = store.update(ghost).await.unwrap_err();

        assert!(matches!(err, Error::NotFound(ref id) if id == "missing"));
        assert_eq!(store.list().await.devices, before);
        assert_eq!(backend.save_count(), 1);
    }

    #[tokio::test]
    async fn test_update_unknown_id_wins_over_validation() {
        let (_, store) = open_memory().await;

        let invalid_ghost = draft("", "zz").into_device("missing");
        let err = store.update(invalid_ghost).await.unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_invalid_fields() {
        let (_, store) = open_memory().await;
        let devices = store.add(draft("a", "00:00:00:00:00:01")).await.unwrap();

        let mut changed = devices[0].clone();
        changed.mac = "GG:BB:CC:DD:EE:FF".into();

        assert!(matches!(store.update(changed).await, Err(Error::Validation(_))));
        assert_eq!(store.list().await.devices, devices);
    }

    #[tokio::test]
    async fn test_delete_twice() {
        let (_, store) = open_memory().await;
        let devices = store.add(draft("a", "00:00:00:00:00:01")).await.unwrap();
        let id = devices[0].id.clone();

        assert!(store.delete(&id).await.unwrap().is_empty());

        let err = store.delete(&id).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));

        let readded = store.add(draft("a", "00:00:00:00:00:01")).await.unwrap();
        assert_ne!(readded[0].id, id);
    }

    #[tokio::test]
    async fn test_delete_preserves_order_of_rest() {
        let (_, store) = open_memory().await;
        store.add(draft("a", "00:00:00:00:00:01")).await.unwrap();
        let devices = store.add(draft("b", "00:00:00:00:00:02")).await.unwrap();
        store.add(draft("c", "00:00:00:00:00:03")).await.unwrap();

        let remaining = store.delete(&devices[1].id).await.unwrap();
        let names: Vec<&str> = remaining.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds() {
        let (backend, store) = open_memory().await;
        let store = Arc::new(store);

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .add(DeviceDraft::new(format!("pc-{}", i), format!("00:00:00:00:00:{:02X}", i)))
                        .await
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let devices = store.list().await.devices;
        assert_eq!(devices.len(), 16);

        let ids: HashSet<&str> = devices.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids.len(), 16);

        assert_eq!(backend.snapshot(), Some(devices));
        assert_eq!(backend.save_count(), 16);
    }

    struct StalledBackend {
        stall_load: bool,
    }

    #[async_trait]
    impl Backend for StalledBackend {
        async fn load(&self) -> Result<Option<Vec<Device>>> {
            if self.stall_load {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(None)
        }

        async fn save(&self, _devices: &[Device]) -> Result<()> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }

        fn describe(&self) -> String {
            "stalled".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_timeout() {
        let backend = Arc::new(StalledBackend { stall_load: false });
        let store = DeviceStore::open_with_timeout(backend, Duration::from_secs(2)).await;

        let err = store.add(draft("pc", "AA:BB:CC:DD:EE:FF")).await.unwrap_err();

        assert!(matches!(err, Error::Timeout { seconds: 2 }));
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_timeout_degrades_to_empty() {
        let backend = Arc::new(StalledBackend { stall_load: true });
        let store = DeviceStore::open_with_timeout(backend, Duration::from_secs(2)).await;

        let listing = store.list().await;
        assert!(listing.devices.is_empty());
        assert!(listing.error.unwrap().to_string().contains("timed out after 2s"));

        let err = store.add(draft("pc", "AA:BB:CC:DD:EE:FF")).await.unwrap_err();
        assert!(matches!(err, Error::Unavailable(_)));
    }
}
