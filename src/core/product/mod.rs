mod entry;
mod record;

pub use entry::{CatalogEntry, EntryMeta, SUPPORTED_SCHEMA};
pub use record::ProductRecord;
