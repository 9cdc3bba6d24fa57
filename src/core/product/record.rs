use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::entry::CatalogEntry;
use crate::core::inspector::locate_executable;
use crate::core::patterns::product_year_from_name;
use crate::core::version::ProductVersion;

/// Vendor folder under the programs root that holds product installs.
const VENDOR_DIR_NAME: &str = "Autodesk";
const PRODUCT_DIR_PREFIX: &str = "Revit";

/// A resolved host application identity.
///
/// `build_number` is the identity key: two records with the same build
/// number describe the same install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub version: Option<ProductVersion>,
    pub build_number: String,
    pub build_target: String,
    /// Installer locale code. Only the installation registry knows it; 0 means unset.
    pub language_code: u32,
    pub install_location: Option<PathBuf>,
}

impl ProductRecord {
    /// Build a record from catalog (or binary-synthesized) data.
    ///
    /// An unparsable version leaves `version` unset instead of failing.
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        let version = if entry.version.trim().is_empty() {
            None
        } else {
            match ProductVersion::parse(&entry.version) {
                Ok(version) => Some(version),
                Err(e) => {
                    warn!("Ignoring version of '{}': {}", entry.name, e);
                    None
                }
            }
        };

        Self {
            name: entry.name.clone(),
            version,
            build_number: entry.build.clone(),
            build_target: entry.target.clone(),
            language_code: 0,
            install_location: None,
        }
    }

    /// Release year: from the name first, then from the major version.
    ///
    /// Majors below 100 are two-digit offsets from 2000 (`18.x` → 2018).
    pub fn product_year(&self) -> u32 {
        let from_name = product_year_from_name(&self.name);
        if from_name != 0 {
            return from_name;
        }

        match self.version {
            Some(version) if version.major < 100 => 2000 + version.major,
            Some(version) => version.major,
            None => 0,
        }
    }

    /// Where the installer puts this product by default, e.g.
    /// `C:\Program Files\Autodesk\Revit 2019`. Not checked for existence.
    pub fn default_install_location(&self, programs_root: &Path) -> Option<PathBuf> {
        match self.product_year() {
            0 => None,
            year => Some(
                programs_root
                    .join(VENDOR_DIR_NAME)
                    .join(format!("{} {}", PRODUCT_DIR_PREFIX, year)),
            ),
        }
    }

    /// The registered install location, or the default location when nothing
    /// was registered and that directory actually exists.
    pub fn effective_install_location(&self, programs_root: &Path) -> Option<PathBuf> {
        let registered = self
            .install_location
            .as_ref()
            .filter(|path| !path.as_os_str().is_empty());
        if let Some(path) = registered {
            return Some(path.clone());
        }

        if let Some(expected) = self.default_install_location(programs_root) {
            debug!("Expected path {:?}", expected);
            if expected.is_dir() {
                return Some(expected);
            }
        }

        self.install_location.clone()
    }

    /// Path of the product executable under the effective install location.
    pub fn executable_location(&self, programs_root: &Path) -> Option<PathBuf> {
        self.effective_install_location(programs_root)
            .and_then(|dir| locate_executable(&dir))
    }
}

impl From<&CatalogEntry> for ProductRecord {
    fn from(entry: &CatalogEntry) -> Self {
        Self::from_entry(entry)
    }
}

impl fmt::Display for ProductRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let version = self
            .version
            .map(|v| v.to_string())
            .unwrap_or_default();
        let path = self
            .install_location
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        write!(
            f,
            "{} | Version: {} | Build: {}({}) | Language: {} | Path: \"{}\"",
            self.name, version, self.build_number, self.build_target, self.language_code, path
        )
    }
}
