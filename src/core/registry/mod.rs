// ─── Installation Registry ───
// Read-only view of the OS install records (Windows "Uninstall" keys).
// Each enumerated entry is a separate result so one unreadable record never
// hides the others.

mod snapshot;
#[cfg(windows)]
mod uninstall;

use serde::{Deserialize, Serialize};

use crate::core::error::HostResult;

pub use snapshot::SnapshotRegistry;
#[cfg(windows)]
pub use uninstall::UninstallRegistry;

/// One installed-application record, as the installer registered it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RegistryEntry {
    /// Subkey (or snapshot) identifier, used for diagnostics only.
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub display_version: Option<String>,
    #[serde(default)]
    pub install_location: Option<String>,
    #[serde(default)]
    pub language: Option<u32>,
}

impl RegistryEntry {
    pub fn new(key: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            display_name: Some(display_name.into()),
            ..Self::default()
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.display_version = Some(version.into());
        self
    }

    pub fn with_install_location(mut self, location: impl Into<String>) -> Self {
        self.install_location = Some(location.into());
        self
    }

    pub fn with_language(mut self, language: u32) -> Self {
        self.language = Some(language);
        self
    }
}

/// Enumerable store of installed-application records.
///
/// The outer error means the store itself could not be opened; inner errors
/// are per-entry read failures.
pub trait InstallRegistry: Send + Sync {
    fn entries(&self) -> HostResult<Vec<HostResult<RegistryEntry>>>;

    /// Entries whose display name passes `accept`. Entries without a display
    /// name are left out; read failures are kept.
    fn entries_named(
        &self,
        accept: &dyn Fn(&str) -> bool,
    ) -> HostResult<Vec<HostResult<RegistryEntry>>> {
        let entries = self.entries()?;
        Ok(entries
            .into_iter()
            .filter(|entry| match entry {
                Ok(entry) => entry.display_name.as_deref().is_some_and(accept),
                Err(_) => true,
            })
            .collect())
    }
}

/// The registry of the running OS: the uninstall keys on Windows, an empty
/// snapshot elsewhere.
pub fn platform_registry() -> Box<dyn InstallRegistry> {
    #[cfg(windows)]
    {
        Box::new(UninstallRegistry::default())
    }

    #[cfg(not(windows))]
    {
        tracing::debug!("No native installation registry on this platform");
        Box::new(SnapshotRegistry::default())
    }
}
