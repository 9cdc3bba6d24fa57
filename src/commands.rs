use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};

use crate::core::error::{HostError, HostResult};
use crate::core::product::ProductRecord;
use crate::core::resolver::HostResolver;

/// A product record as presented to callers, with derived fields filled in.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    pub name: String,
    pub version: Option<String>,
    pub build_number: String,
    pub build_target: String,
    pub language_code: u32,
    pub product_year: u32,
    pub install_location: Option<PathBuf>,
    pub executable: Option<PathBuf>,
}

impl ProductView {
    pub fn new(record: &ProductRecord, resolver: &HostResolver) -> Self {
        Self {
            name: record.name.clone(),
            version: record.version.map(|v| v.to_string()),
            build_number: record.build_number.clone(),
            build_target: record.build_target.clone(),
            language_code: record.language_code,
            product_year: record.product_year(),
            install_location: record.install_location.clone(),
            executable: record.executable_location(resolver.programs_root()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanKind {
    Installed,
    Known,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub kind: ScanKind,
    pub scanned_at: DateTime<Utc>,
    pub catalog: Option<PathBuf>,
    pub products: Vec<ProductView>,
}

impl ScanReport {
    fn new(kind: ScanKind, resolver: &HostResolver, records: &[ProductRecord]) -> Self {
        Self {
            kind,
            scanned_at: Utc::now(),
            catalog: resolver.catalog().origin().map(|p| p.to_path_buf()),
            products: records
                .iter()
                .map(|record| ProductView::new(record, resolver))
                .collect(),
        }
    }
}

pub fn installed_products(resolver: &HostResolver) -> ScanReport {
    let records = resolver.list_installed();
    ScanReport::new(ScanKind::Installed, resolver, &records)
}

pub fn known_products(resolver: &HostResolver) -> ScanReport {
    let records = resolver.list_known();
    ScanReport::new(ScanKind::Known, resolver, &records)
}

pub fn lookup_product(resolver: &HostResolver, identifier: &str) -> HostResult<ProductView> {
    resolver
        .lookup(identifier)
        .map(|record| ProductView::new(&record, resolver))
        .ok_or_else(|| HostError::ProductNotFound(identifier.to_string()))
}

/// Run the installed-products scan on a blocking worker, bounded by `limit`.
pub async fn installed_products_within(
    resolver: Arc<HostResolver>,
    limit: Duration,
) -> HostResult<ScanReport> {
    let scan = tokio::task::spawn_blocking(move || installed_products(&resolver));
    match tokio::time::timeout(limit, scan).await {
        Ok(Ok(report)) => {
            info!("Scan finished with {} products", report.products.len());
            Ok(report)
        }
        Ok(Err(join_error)) => {
            error!("Installation scan worker failed: {}", join_error);
            Err(HostError::Other(join_error.to_string()))
        }
        Err(_) => Err(HostError::Timeout(limit.as_secs())),
    }
}
