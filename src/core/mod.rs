// ─── revit-hosts Core ───
// Detection of installed host application products.
//
// Architecture:
//   core/
//     catalog/   : Bundled dataset of known builds + identifier lookup
//     inspector/ : Executable discovery + embedded version strings
//     registry/  : Installation registry (Windows uninstall keys, snapshots)
//     resolver/  : Reconciliation of the three sources into product records
//     product/   : Catalog entries and resolved product records
//     version/   : Dotted numeric product versions
//     patterns   : Build number / target / year extraction
//     paths      : Install path normalization and default locations
//     config     : Layered resolver settings

pub mod catalog;
pub mod config;
pub mod error;
pub mod inspector;
pub mod paths;
pub mod patterns;
pub mod product;
pub mod registry;
pub mod resolver;
pub mod version;
