use std::path::{Path, PathBuf};

use crate::core::catalog::CATALOG_FILE_NAME;

const PROGRAM_FILES_FALLBACK: &str = r"C:\Program Files";

/// Normalize a registry-supplied install path.
///
/// Strips surrounding whitespace and quotes and any trailing separators
/// (but keeps a bare root such as `C:\` or `/`). Empty input gives `None`.
pub fn normalize_install_path(raw: &str) -> Option<PathBuf> {
    let trimmed = raw.trim().trim_matches('"').trim();
    if trimmed.is_empty() {
        return None;
    }

    let without_trailing = trimmed.trim_end_matches(['\\', '/']);
    let normalized = if without_trailing.is_empty() || without_trailing.ends_with(':') {
        // "\" or "C:\" stay rooted
        &trimmed[..without_trailing.len() + 1]
    } else {
        without_trailing
    };
    Some(PathBuf::from(normalized))
}

/// Root that default product install folders live under (`%ProgramFiles%`).
pub fn default_programs_root() -> PathBuf {
    std::env::var_os("ProgramFiles")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(PROGRAM_FILES_FALLBACK))
}

/// The dataset shipped next to the running executable, falling back to the
/// copy in the source tree for development builds.
pub fn default_catalog_path() -> PathBuf {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(CATALOG_FILE_NAME)));
    if let Some(path) = beside_exe.filter(|p| p.is_file()) {
        return path;
    }
    resource_dir().join(CATALOG_FILE_NAME)
}

pub fn resource_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("resources")
}
