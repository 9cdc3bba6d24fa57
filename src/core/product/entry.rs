use serde::{Deserialize, Serialize};

/// Dataset schema this crate understands. Entries tagged with any other
/// schema are skipped by lookups.
pub const SUPPORTED_SCHEMA: &str = "1.0";

/// Provenance block carried by each dataset entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntryMeta {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default)]
    pub source: Option<String>,
}

impl Default for EntryMeta {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            source: None,
        }
    }
}

fn default_schema() -> String {
    SUPPORTED_SCHEMA.to_string()
}

/// A known product build, as listed in the bundled dataset or synthesized
/// from an executable's version resource.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    #[serde(default, alias = "schema-meta")]
    pub meta: EntryMeta,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub build: String,
    #[serde(default)]
    pub target: String,
}

impl CatalogEntry {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        build: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            meta: EntryMeta::default(),
            name: name.into(),
            version: version.into(),
            build: build.into(),
            target: target.into(),
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.meta.source = Some(source.into());
        self
    }

    pub fn is_supported_schema(&self) -> bool {
        self.meta.schema == SUPPORTED_SCHEMA
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_dataset_entry() {
        let json = r#"{
            "meta": { "schema": "1.0", "source": "https://example.com/builds" },
            "name": "Revit 2019",
            "version": "19.0.0.405",
            "build": "20180216_1515",
            "target": "x64"
        }"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.name, "Revit 2019");
        assert_eq!(entry.build, "20180216_1515");
        assert!(entry.is_supported_schema());
        assert_eq!(entry.meta.source.as_deref(), Some("https://example.com/builds"));
    }

    #[test]
    fn schema_meta_alias_and_defaults() {
        let json = r#"{
            "schema-meta": { "schema": "2.0" },
            "name": "Revit 2030",
            "version": "30.0.0.1",
            "build": "20290401_1515"
        }"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.meta.schema, "2.0");
        assert!(!entry.is_supported_schema());
        assert_eq!(entry.target, "");

        let bare: CatalogEntry = serde_json::from_str(r#"{ "name": "Revit 2017" }"#).unwrap();
        assert!(bare.is_supported_schema());
    }
}
