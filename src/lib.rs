pub mod commands;
pub mod core;

use tracing_subscriber::EnvFilter;

pub use crate::core::catalog::HostCatalog;
pub use crate::core::config::ResolverSettings;
pub use crate::core::error::{HostError, HostResult};
pub use crate::core::inspector::{
    extract_build_number, extract_build_target, locate_executable, BinaryInspector,
    FileVersionStrings, VersionInfoReader, Win32VersionInfoReader,
};
pub use crate::core::product::{CatalogEntry, ProductRecord};
pub use crate::core::registry::{InstallRegistry, RegistryEntry, SnapshotRegistry};
pub use crate::core::resolver::HostResolver;
pub use crate::core::version::ProductVersion;

/// Install the process-wide log subscriber. Logs go to stderr so stdout can
/// carry machine-readable output.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,revit_hosts=debug")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}
