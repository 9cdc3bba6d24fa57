// ─── Installation Resolver ───
// Reconciles installation registry records with the catalog and with the
// installed executable's own version strings.
//
// Per registry entry:
//   1. family filter on the display name
//   2. raw fields (name, version, normalized path, language)
//   3. catalog lookup by display version
//   4. fallback: executable version strings → catalog lookup by build,
//      else a record synthesized from the binary
//   5. backfill missing fields from the registry; language always from it
//   6. insert keyed by build number, first record wins

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument, warn};

use crate::core::catalog::HostCatalog;
use crate::core::config::ResolverSettings;
use crate::core::error::HostResult;
use crate::core::inspector::{locate_executable, BinaryInspector};
use crate::core::paths::normalize_install_path;
use crate::core::patterns::FamilyFilter;
use crate::core::product::ProductRecord;
use crate::core::registry::{platform_registry, InstallRegistry, RegistryEntry};
use crate::core::version::ProductVersion;

/// Fields observed on one registry entry, after normalization.
#[derive(Debug, Clone)]
struct ObservedInstall {
    display_name: String,
    display_version: String,
    install_path: Option<PathBuf>,
    language_code: u32,
}

impl ObservedInstall {
    fn from_entry(entry: &RegistryEntry) -> Self {
        let observed = Self {
            display_name: entry.display_name.clone().unwrap_or_default(),
            display_version: entry
                .display_version
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            install_path: entry
                .install_location
                .as_deref()
                .and_then(normalize_install_path),
            language_code: entry.language.unwrap_or(0),
        };
        debug!("Version from registry key: {:?}", observed.display_version);
        debug!("Install path from registry key: {:?}", observed.install_path);
        debug!("Language code from registry key: {}", observed.language_code);
        observed
    }
}

pub struct HostResolver {
    catalog: HostCatalog,
    registry: Box<dyn InstallRegistry>,
    inspector: BinaryInspector,
    family: FamilyFilter,
    programs_root: PathBuf,
}

impl HostResolver {
    pub fn new(
        catalog: HostCatalog,
        registry: Box<dyn InstallRegistry>,
        inspector: BinaryInspector,
        settings: &ResolverSettings,
    ) -> HostResult<Self> {
        Ok(Self {
            catalog,
            registry,
            inspector,
            family: FamilyFilter::new(&settings.family_name)?,
            programs_root: settings.programs_root.clone(),
        })
    }

    /// Resolver over the bundled catalog and this machine's registry.
    pub fn from_settings(settings: &ResolverSettings) -> HostResult<Self> {
        let catalog = HostCatalog::load_bundled(settings)?;
        Self::new(
            catalog,
            platform_registry(),
            BinaryInspector::default(),
            settings,
        )
    }

    pub fn catalog(&self) -> &HostCatalog {
        &self.catalog
    }

    pub fn programs_root(&self) -> &Path {
        &self.programs_root
    }

    /// Every product installed according to the registry.
    ///
    /// Never fails: unreadable or unresolvable entries are logged and skipped,
    /// so the result may be partial or empty.
    #[instrument(skip(self))]
    pub fn list_installed(&self) -> Vec<ProductRecord> {
        let accept = |name: &str| self.family.is_match(name);
        let entries = match self.registry.entries_named(&accept) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Installation registry not readable: {}", e);
                return Vec::new();
            }
        };

        let total = entries.len();
        let mut installed: BTreeMap<String, ProductRecord> = BTreeMap::new();
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping registry entry: {}", e);
                    continue;
                }
            };

            let Some(app_name) = entry.display_name.as_deref() else {
                continue;
            };
            debug!("App is a product install: {}", app_name);

            let Some(record) = self.resolve_entry(&entry) else {
                debug!("Can not determine product for {:?}", app_name);
                continue;
            };
            debug!("Resolved product: {}", record);

            match installed.entry(record.build_number.clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
                Entry::Occupied(existing) => {
                    debug!(
                        "Already discovered {:?}, ignoring duplicate from {:?}",
                        existing.key(),
                        entry.key
                    );
                }
            }
        }

        info!(
            "Found {} installed products in {} matching registry entries",
            installed.len(),
            total
        );
        installed.into_values().collect()
    }

    /// Every product the catalog knows about, installed or not.
    pub fn list_known(&self) -> Vec<ProductRecord> {
        self.catalog
            .all_entries()
            .map(ProductRecord::from_entry)
            .collect()
    }

    /// Catalog lookup by build number, version or name.
    pub fn lookup(&self, identifier: &str) -> Option<ProductRecord> {
        self.catalog
            .find_by_identifier(identifier)
            .map(ProductRecord::from_entry)
    }

    pub fn lookup_version(&self, version: &ProductVersion) -> Option<ProductRecord> {
        self.lookup(&version.to_string())
    }

    /// Steps 2 to 5 for a single family-matching registry entry.
    fn resolve_entry(&self, entry: &RegistryEntry) -> Option<ProductRecord> {
        let observed = ObservedInstall::from_entry(entry);

        let mut record = self.lookup_display_version(&observed).or_else(|| {
            debug!(
                "Could not determine product from version {:?}",
                observed.display_version
            );
            self.binary_fallback(&observed)
        })?;

        self.backfill(&mut record, &observed);
        Some(record)
    }

    fn lookup_display_version(&self, observed: &ObservedInstall) -> Option<ProductRecord> {
        if observed.display_version.is_empty() {
            return None;
        }
        self.lookup(&observed.display_version)
    }

    /// Identify the install from its executable's version strings.
    fn binary_fallback(&self, observed: &ObservedInstall) -> Option<ProductRecord> {
        let install_path = observed.install_path.as_deref()?;
        let binary = locate_executable(install_path)?;

        let info = match self.inspector.read_binary_info(&binary) {
            Ok(info) => info,
            Err(e) => {
                debug!("Failed reading product info from binary at {:?}: {}", binary, e);
                return None;
            }
        };

        let known = if info.build.is_empty() {
            None
        } else {
            self.lookup(&info.build)
        };
        // unknown builds (e.g. releases newer than the dataset) keep what the binary says
        Some(known.unwrap_or_else(|| ProductRecord::from_entry(&info)))
    }

    fn backfill(&self, record: &mut ProductRecord, observed: &ObservedInstall) {
        if record.name.is_empty() {
            record.name = observed.display_name.clone();
        }

        if record.version.is_none() && !observed.display_version.is_empty() {
            record.version = ProductVersion::parse(&observed.display_version).ok();
        }

        let has_location = record
            .install_location
            .as_ref()
            .is_some_and(|path| !path.as_os_str().is_empty());
        if !has_location {
            record.install_location = observed.install_path.clone();
        }
        record.install_location = record.effective_install_location(&self.programs_root);

        // only the registry knows the installer locale
        record.language_code = observed.language_code;
    }
}
