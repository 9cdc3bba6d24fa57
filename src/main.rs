use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::error;

use revit_hosts::commands::{installed_products_within, known_products, lookup_product};
use revit_hosts::core::registry::platform_registry;
use revit_hosts::{
    BinaryInspector, HostCatalog, HostError, HostResolver, HostResult, InstallRegistry,
    ResolverSettings, SnapshotRegistry,
};

#[derive(Debug, Parser)]
#[command(name = "revit-hosts", version, about = "List installed and known Revit products")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Product dataset to use instead of the bundled one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Read installation records from a JSON snapshot instead of the OS registry
    #[arg(long, global = true)]
    registry_snapshot: Option<PathBuf>,

    /// Root folder holding default installs (defaults to %ProgramFiles%)
    #[arg(long, global = true)]
    programs_root: Option<PathBuf>,

    /// Give up on the installed-products scan after this many seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Products installed on this machine
    Installed,
    /// Every product in the dataset
    Known,
    /// Look up a product by build number, version or name
    Lookup { identifier: String },
}

#[derive(Serialize)]
struct ErrorReport<'a> {
    error: &'a HostError,
}

#[tokio::main]
async fn main() -> ExitCode {
    revit_hosts::init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            let _ = print_json(&ErrorReport { error: &e });
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> HostResult<()> {
    let mut settings = ResolverSettings::load();
    if let Some(catalog) = cli.catalog {
        settings.catalog_path = catalog;
    }
    if let Some(programs_root) = cli.programs_root {
        settings.programs_root = programs_root;
    }

    let registry: Box<dyn InstallRegistry> = match &cli.registry_snapshot {
        Some(path) => Box::new(SnapshotRegistry::load_from(path)?),
        None => platform_registry(),
    };
    let catalog = HostCatalog::load_bundled(&settings)?;
    let resolver = HostResolver::new(catalog, registry, BinaryInspector::default(), &settings)?;

    match cli.command {
        Command::Installed => {
            let limit = Duration::from_secs(cli.timeout_secs);
            let report = installed_products_within(Arc::new(resolver), limit).await?;
            print_json(&report)
        }
        Command::Known => print_json(&known_products(&resolver)),
        Command::Lookup { identifier } => print_json(&lookup_product(&resolver, &identifier)?),
    }
}

fn print_json<T: Serialize>(value: &T) -> HostResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
