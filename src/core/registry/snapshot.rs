use std::path::Path;

use tracing::info;

use super::{InstallRegistry, RegistryEntry};
use crate::core::error::{HostError, HostResult};

/// Installation records held in memory, optionally loaded from a JSON dump
/// (an array of `RegistryEntry` objects).
#[derive(Debug, Clone, Default)]
pub struct SnapshotRegistry {
    entries: Vec<RegistryEntry>,
}

impl SnapshotRegistry {
    pub fn from_entries(entries: Vec<RegistryEntry>) -> Self {
        Self { entries }
    }

    pub fn load_from(path: &Path) -> HostResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| HostError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let entries: Vec<RegistryEntry> = serde_json::from_str(&raw)?;
        info!("Loaded {} registry entries from {:?}", entries.len(), path);
        Ok(Self { entries })
    }

    pub fn save_to(&self, path: &Path) -> HostResult<()> {
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(path, json).map_err(|source| HostError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl InstallRegistry for SnapshotRegistry {
    fn entries(&self) -> HostResult<Vec<HostResult<RegistryEntry>>> {
        Ok(self.entries.iter().cloned().map(Ok).collect())
    }
}
