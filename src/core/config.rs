// ─── Resolver Settings ───
// Defaults, then `<config_dir>/revit-hosts/settings.json`, then environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::paths::{default_catalog_path, default_programs_root};

const APP_DIR_NAME: &str = "revit-hosts";
const SETTINGS_FILE: &str = "settings.json";
const DEFAULT_FAMILY_NAME: &str = "Revit";

pub const ENV_CATALOG: &str = "REVIT_HOSTS_CATALOG";
pub const ENV_FAMILY: &str = "REVIT_HOSTS_FAMILY";
pub const ENV_PROGRAMS_ROOT: &str = "REVIT_HOSTS_PROGRAMS_ROOT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// Location of the product dataset.
    pub catalog_path: PathBuf,
    /// Leading token of registry display names that belong to the product.
    pub family_name: String,
    /// Parent of the vendor folder holding default installs.
    pub programs_root: PathBuf,
}

/// On-disk overrides; absent fields keep the current value.
#[derive(Debug, Clone, Default, Deserialize)]
struct SettingsFile {
    catalog_path: Option<PathBuf>,
    family_name: Option<String>,
    programs_root: Option<PathBuf>,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            catalog_path: default_catalog_path(),
            family_name: DEFAULT_FAMILY_NAME.to_string(),
            programs_root: default_programs_root(),
        }
    }
}

impl ResolverSettings {
    /// Fully layered settings for the current user and process environment.
    pub fn load() -> Self {
        let mut settings = Self::default();
        if let Some(path) = settings_file_path() {
            settings.apply_file(&path);
        }
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Merge a settings file. Missing files are ignored; unreadable ones are
    /// logged and ignored.
    pub fn apply_file(&mut self, path: &Path) {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(_) => {
                debug!("No settings file at {:?}", path);
                return;
            }
        };
        match serde_json::from_str::<SettingsFile>(&raw) {
            Ok(file) => {
                if let Some(catalog_path) = file.catalog_path {
                    self.catalog_path = catalog_path;
                }
                if let Some(family_name) = file.family_name {
                    self.family_name = family_name;
                }
                if let Some(programs_root) = file.programs_root {
                    self.programs_root = programs_root;
                }
            }
            Err(e) => warn!("Ignoring malformed settings file {:?}: {}", path, e),
        }
    }

    /// Merge environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(catalog_path) = non_empty(ENV_CATALOG) {
            self.catalog_path = PathBuf::from(catalog_path);
        }
        if let Some(family_name) = non_empty(ENV_FAMILY) {
            self.family_name = family_name.trim().to_string();
        }
        if let Some(programs_root) = non_empty(ENV_PROGRAMS_ROOT) {
            self.programs_root = PathBuf::from(programs_root);
        }
    }
}

fn settings_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(SETTINGS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_revit() {
        let settings = ResolverSettings::default();
        assert_eq!(settings.family_name, "Revit");
        assert!(settings.catalog_path.ends_with("revit-hosts.json"));
    }

    #[test]
    fn file_overrides_only_present_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        std::fs::write(&path, r#"{ "programs_root": "D:\\Apps" }"#).unwrap();

        let mut settings = ResolverSettings::default();
        let before = settings.clone();
        settings.apply_file(&path);
        assert_eq!(settings.programs_root, PathBuf::from("D:\\Apps"));
        assert_eq!(settings.family_name, before.family_name);
        assert_eq!(settings.catalog_path, before.catalog_path);
    }

    #[test]
    fn malformed_or_missing_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE);
        let mut settings = ResolverSettings::default();
        let before = settings.clone();

        settings.apply_file(&path);
        assert_eq!(settings, before);

        std::fs::write(&path, "not json").unwrap();
        settings.apply_file(&path);
        assert_eq!(settings, before);
    }

    #[test]
    fn env_overrides_win_and_blank_values_are_skipped() {
        let mut settings = ResolverSettings::default();
        settings.apply_env(|key| match key {
            ENV_CATALOG => Some("/srv/hosts.json".to_string()),
            ENV_FAMILY => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(settings.catalog_path, PathBuf::from("/srv/hosts.json"));
        assert_eq!(settings.family_name, "Revit");
    }
}
