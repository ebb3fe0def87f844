//! JSON file backend
//!
//! The collection is written to a sibling temporary file, flushed to disk,
//! then renamed over the target. Readers only ever see the old file or the
//! complete new one. Each save gets its own temporary name, so a write left
//! running by a timed-out save cannot touch a later one.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;
use wolkit_core::constants::DEVICES_FILE;
use wolkit_types::Device;

use crate::{backend::Backend, error::*};

/// Device collection stored as a JSON array in a single file
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    /// Use `path` as the device file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Use `devices.json` inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(DEVICES_FILE))
    }

    /// Path of the device file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEVICES_FILE.into());
        name.push(format!(".{}.tmp", Uuid::new_v4().simple()));
        self.path.with_file_name(name)
    }

    fn io_error(path: &Path, source: std::io::Error) -> Error {
        Error::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    async fn write_temp(&self, tmp: &Path, data: &[u8]) -> Result<()> {
        let mut file = File::create(tmp)
            .await
            .map_err(|e| Self::io_error(tmp, e))?;
        file.write_all(data)
            .await
            .map_err(|e| Self::io_error(tmp, e))?;
        file.sync_all()
            .await
            .map_err(|e| Self::io_error(tmp, e))?;
        Ok(())
    }
}

#[async_trait]
impl Backend for FileBackend {
    async fn load(&self) -> Result<Option<Vec<Device>>> {
        debug!("Reading devices from {:?}", self.path);

        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Device file not found at {:?}", self.path);
                return Ok(None);
            }
            Err(e) => return Err(Self::io_error(&self.path, e)),
        };

        let devices = serde_json::from_slice(&data).map_err(|source| Error::Decode {
            path: self.path.clone(),
            source,
        })?;

        Ok(Some(devices))
    }

    async fn save(&self, devices: &[Device]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| Self::io_error(dir, e))?;
        }

        let data = serde_json::to_vec_pretty(devices).map_err(Error::Encode)?;
        let tmp = self.temp_path();

        if let Err(e) = self.write_temp(&tmp, &data).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }

        if let Err(e) = fs::rename(&tmp, &self.path).await {
            warn!("Failed to replace {:?}: {}", self.path, e);
            let _ = fs::remove_file(&tmp).await;
            return Err(Self::io_error(&self.path, e));
        }

        // Persist the rename itself
        #[cfg(unix)]
        {
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                if let Ok(dir) = File::open(dir).await {
                    let _ = dir.sync_all().await;
                }
            }
        }

        debug!("Wrote {} devices to {:?}", devices.len(), self.path);
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
