// ─── Reference Catalog ───
// Bundled dataset of known product builds (name / version / build / target).
// Loaded once, immutable afterwards, queried by build, version or name.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::config::ResolverSettings;
use crate::core::error::{HostError, HostResult};
use crate::core::patterns::extract_build_number;
use crate::core::product::CatalogEntry;

/// File name of the bundled dataset.
pub const CATALOG_FILE_NAME: &str = "revit-hosts.json";

#[derive(Debug, Clone, Default)]
pub struct HostCatalog {
    entries: Vec<CatalogEntry>,
    origin: Option<PathBuf>,
}

impl HostCatalog {
    /// Wrap an already materialized entry list (tests, tooling).
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            origin: None,
        }
    }

    /// Load the dataset from the location configured in `settings`.
    pub fn load_bundled(settings: &ResolverSettings) -> HostResult<Self> {
        Self::load_from(&settings.catalog_path)
    }

    /// Read and parse a dataset document. A missing or malformed document is
    /// a deployment error and is reported as `DataUnavailable`.
    pub fn load_from(path: &Path) -> HostResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| HostError::DataUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let entries = Self::parse(&raw).map_err(|e| HostError::DataUnavailable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        info!("Loaded {} product entries from {:?}", entries.len(), path);
        Ok(Self {
            entries,
            origin: Some(path.to_path_buf()),
        })
    }

    fn parse(raw: &str) -> HostResult<Vec<CatalogEntry>> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Where the dataset was read from, if it came from disk.
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Every entry of the understood schema, in document order.
    pub fn all_entries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|entry| entry.is_supported_schema())
    }

    /// Find a product by build number, version or name (case-insensitive).
    ///
    /// `identifier` may be noisy: if it embeds a build number such as
    /// `20110309_2315`, only that build number is looked up. Fields are
    /// tried in priority order name, version, build; within one field the
    /// first entry in document order wins.
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&CatalogEntry> {
        let build_number = extract_build_number(identifier);
        let needle = if build_number.is_empty() {
            identifier.to_lowercase()
        } else {
            build_number.to_lowercase()
        };

        let by_name = |entry: &&CatalogEntry| entry.name.to_lowercase() == needle;
        let by_version = |entry: &&CatalogEntry| entry.version.to_lowercase() == needle;
        let by_build = |entry: &&CatalogEntry| entry.build.to_lowercase() == needle;

        let found = self
            .all_entries()
            .find(by_name)
            .or_else(|| self.all_entries().find(by_version))
            .or_else(|| self.all_entries().find(by_build));

        debug!("Catalog lookup {:?} -> {:?}", needle, found.map(|e| &e.name));
        found
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::product::EntryMeta;

    fn sample() -> HostCatalog {
        HostCatalog::from_entries(vec![
            CatalogEntry::new("Revit 2018", "18.0.0.420", "20170223_1515", "x64"),
            CatalogEntry::new("Revit 2019", "19.0.0.405", "20180216_1515", "x64"),
            CatalogEntry::new("Revit 2019.1", "19.1.0.112", "20180806_1515", "x64"),
        ])
    }

    #[test]
    fn find_by_build_version_and_name() {
        let catalog = sample();
        assert_eq!(
            catalog.find_by_identifier("20180216_1515").unwrap().name,
            "Revit 2019"
        );
        assert_eq!(
            catalog.find_by_identifier("19.1.0.112").unwrap().build,
            "20180806_1515"
        );
        assert_eq!(
            catalog.find_by_identifier("revit 2018").unwrap().version,
            "18.0.0.420"
        );
        assert!(catalog.find_by_identifier("Revit 2030").is_none());
    }

    #[test]
    fn noisy_identifier_is_reduced_to_build_number() {
        let catalog = sample();
        let found = catalog
            .find_by_identifier("19.0.0.405 20180216_1515(x64)")
            .unwrap();
        assert_eq!(found.name, "Revit 2019");
    }

    #[test]
    fn name_match_outranks_earlier_version_match() {
        let catalog = HostCatalog::from_entries(vec![
            CatalogEntry::new("Odd Build", "Revit Preview", "20200101_0000", ""),
            CatalogEntry::new("Revit Preview", "21.0.0.0", "20200202_0000", ""),
        ]);
        assert_eq!(
            catalog.find_by_identifier("REVIT PREVIEW").unwrap().build,
            "20200202_0000"
        );
    }

    #[test]
    fn unsupported_schema_is_invisible() {
        let mut future = CatalogEntry::new("Revit 2030", "30.0.0.1", "20290401_1515", "x64");
        future.meta = EntryMeta {
            schema: "2.0".into(),
            source: None,
        };
        let catalog = HostCatalog::from_entries(vec![future]);
        assert!(catalog.find_by_identifier("20290401_1515").is_none());
        assert!(catalog.find_by_identifier("Revit 2030").is_none());
        assert_eq!(catalog.all_entries().count(), 0);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn missing_document_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = HostCatalog::load_from(&dir.path().join(CATALOG_FILE_NAME)).unwrap_err();
        assert!(matches!(err, HostError::DataUnavailable { .. }));
    }

    #[test]
    fn malformed_document_is_data_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CATALOG_FILE_NAME);
        std::fs::write(&path, r#"{ "name": "not an array" }"#).unwrap();
        let err = HostCatalog::load_from(&path).unwrap_err();
        assert!(matches!(err, HostError::DataUnavailable { .. }));
    }

    #[test]
    fn bundled_dataset_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("resources")
            .join(CATALOG_FILE_NAME);
        let catalog = HostCatalog::load_from(&path).unwrap();
        assert!(catalog.all_entries().count() > 0);
        assert!(catalog
            .all_entries()
            .all(|entry| extract_build_number(&entry.build) == entry.build));
        assert_eq!(catalog.origin(), Some(path.as_path()));
    }
}
