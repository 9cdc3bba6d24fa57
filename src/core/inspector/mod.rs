// ─── Binary Inspector ───
// Finds the product executable under an install directory and turns its
// embedded version strings into a catalog-shaped entry.

mod version_info;

use std::path::{Path, PathBuf};

use tracing::debug;

pub use version_info::{FileVersionStrings, VersionInfoReader, Win32VersionInfoReader};

pub use crate::core::patterns::{extract_build_number, extract_build_target};
use crate::core::error::{HostError, HostResult};
use crate::core::product::CatalogEntry;

const EXECUTABLE_NAME: &str = "Revit.exe";

/// Relative locations probed, in order, for the executable.
fn executable_candidates(install_dir: &Path) -> [PathBuf; 2] {
    [
        install_dir.join(EXECUTABLE_NAME),
        install_dir.join("Program").join(EXECUTABLE_NAME),
    ]
}

/// First existing executable under `install_dir`, if any.
pub fn locate_executable(install_dir: &Path) -> Option<PathBuf> {
    if install_dir.as_os_str().is_empty() {
        return None;
    }
    executable_candidates(install_dir)
        .into_iter()
        .find(|candidate| candidate.is_file())
}

pub struct BinaryInspector {
    reader: Box<dyn VersionInfoReader>,
}

impl Default for BinaryInspector {
    fn default() -> Self {
        Self::new(Box::new(Win32VersionInfoReader))
    }
}

impl BinaryInspector {
    pub fn new(reader: Box<dyn VersionInfoReader>) -> Self {
        Self { reader }
    }

    /// Describe the executable at `executable_path` from its version resource.
    ///
    /// The name is synthesized as `"<product name> 20<yy>"` from the first two
    /// characters of the file version (`19.0.0.405` → `Revit 2019`).
    pub fn read_binary_info(&self, executable_path: &Path) -> HostResult<CatalogEntry> {
        if !executable_path.is_file() {
            return Err(HostError::MetadataUnreadable {
                path: executable_path.to_path_buf(),
                reason: "file does not exist".to_string(),
            });
        }

        let strings = self.reader.read(executable_path)?;
        let year_suffix: String = strings.file_version.trim().chars().take(2).collect();
        if year_suffix.chars().count() < 2 {
            return Err(HostError::MetadataUnreadable {
                path: executable_path.to_path_buf(),
                reason: format!("unusable file version {:?}", strings.file_version),
            });
        }

        let entry = CatalogEntry::new(
            format!("{} 20{}", strings.product_name.trim(), year_suffix),
            strings.file_version.trim(),
            extract_build_number(&strings.product_version),
            extract_build_target(&strings.product_version),
        )
        .with_source(executable_path.display().to_string());

        debug!(
            "Read build number {:?} from binary at {:?}",
            entry.build, executable_path
        );
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Answers every read with the same strings, or fails with `Other(reason)`.
    struct FixedReader(Result<FileVersionStrings, String>);

    impl VersionInfoReader for FixedReader {
        fn read(&self, _path: &Path) -> HostResult<FileVersionStrings> {
            self.0.clone().map_err(HostError::Other)
        }
    }

    fn strings(file_version: &str, product_version: &str) -> FileVersionStrings {
        FileVersionStrings {
            product_name: "Revit".into(),
            file_version: file_version.into(),
            product_version: product_version.into(),
        }
    }

    #[test]
    fn locate_prefers_root_then_program_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(locate_executable(dir.path()), None);

        let nested = dir.path().join("Program");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(nested.join(EXECUTABLE_NAME), b"").unwrap();
        assert_eq!(
            locate_executable(dir.path()),
            Some(nested.join(EXECUTABLE_NAME))
        );

        std::fs::write(dir.path().join(EXECUTABLE_NAME), b"").unwrap();
        assert_eq!(
            locate_executable(dir.path()),
            Some(dir.path().join(EXECUTABLE_NAME))
        );
    }

    #[test]
    fn locate_ignores_empty_install_dir() {
        assert_eq!(locate_executable(Path::new("")), None);
    }

    #[test]
    fn binary_info_synthesizes_entry() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join(EXECUTABLE_NAME);
        std::fs::write(&exe, b"MZ").unwrap();

        let inspector = BinaryInspector::new(Box::new(FixedReader(Ok(strings(
            "19.0.0.405",
            "2019 20180216_1515(x64)",
        )))));
        let entry = inspector.read_binary_info(&exe).unwrap();
        assert_eq!(entry.name, "Revit 2019");
        assert_eq!(entry.version, "19.0.0.405");
        assert_eq!(entry.build, "20180216_1515");
        assert_eq!(entry.target, "x64");
        assert!(entry.is_supported_schema());
    }

    #[test]
    fn binary_info_without_build_token() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join(EXECUTABLE_NAME);
        std::fs::write(&exe, b"MZ").unwrap();

        let inspector =
            BinaryInspector::new(Box::new(FixedReader(Ok(strings("24.0.0.1", "preview")))));
        let entry = inspector.read_binary_info(&exe).unwrap();
        assert_eq!(entry.name, "Revit 2024");
        assert_eq!(entry.build, "");
        assert_eq!(entry.target, "");
    }

    #[test]
    fn missing_file_is_metadata_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let inspector = BinaryInspector::new(Box::new(FixedReader(Ok(strings("19.0", "")))));
        let err = inspector
            .read_binary_info(&dir.path().join(EXECUTABLE_NAME))
            .unwrap_err();
        assert!(matches!(err, HostError::MetadataUnreadable { .. }));
    }

    #[test]
    fn short_file_version_is_metadata_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join(EXECUTABLE_NAME);
        std::fs::write(&exe, b"MZ").unwrap();

        let inspector = BinaryInspector::new(Box::new(FixedReader(Ok(strings("1", "")))));
        assert!(matches!(
            inspector.read_binary_info(&exe),
            Err(HostError::MetadataUnreadable { .. })
        ));
    }

    #[test]
    fn reader_failure_is_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join(EXECUTABLE_NAME);
        std::fs::write(&exe, b"MZ").unwrap();

        let inspector = BinaryInspector::new(Box::new(FixedReader(Err("access denied".into()))));
        assert!(matches!(
            inspector.read_binary_info(&exe),
            Err(HostError::Other(reason)) if reason == "access denied"
        ));
    }
}
