//! `brickledger`: reconcile marketplace exports against the ledger snapshot.
//!
//! Every command prints JSON on stdout. Commands that change state save the
//! snapshot afterwards.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use brickledger_catalog::{CatalogSnapshot, InMemoryCatalog};
use brickledger_core::{ColorId, PartId, SourceSystem};
use brickledger_infra::{AppConfig, InMemoryLedgerStore, InventoryService};
use brickledger_reconcile::ForeignLineItem;

#[derive(Parser)]
#[command(name = "brickledger")]
#[command(about = "Parts inventory ledger with alias reconciliation")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./brickledger.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ledger snapshot; overrides `snapshot_path` from the configuration
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Catalog JSON (parts, colors, sets)
    #[arg(long, default_value = "data/catalog.json")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an export without writing anything
    Precheck {
        /// JSON array of export lines
        export: PathBuf,
    },

    /// Resolve and commit an export in one transaction
    Import {
        export: PathBuf,
    },

    /// Run the sanity checker over the ledger
    Check,

    /// Propose aliases for an unknown source part id
    Suggest {
        #[arg(long)]
        system: SourceSystem,
        source_part_id: String,
    },

    /// Map a source part id to a canonical part
    AliasPart {
        #[arg(long)]
        system: SourceSystem,
        source_part_id: String,
        canonical: PartId,
        /// Only apply to this source color
        #[arg(long)]
        color_scope: Option<i32>,
    },

    /// Map a source color id to a canonical color
    AliasColor {
        #[arg(long)]
        system: SourceSystem,
        source_color_id: i32,
        canonical: i32,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = AppConfig::load_from(cli.config.as_deref()).context("loading configuration")?;
    brickledger_observability::init_with_filter(&config.log_filter);

    let snapshot_path = cli.snapshot.clone().unwrap_or_else(|| config.snapshot_path.clone());
    let catalog = load_catalog(&cli.catalog)?;
    let store = InMemoryLedgerStore::open(&snapshot_path)
        .with_context(|| format!("opening snapshot {}", snapshot_path.display()))?;
    let service = InventoryService::from_config(catalog, store, &config);

    match cli.command {
        Commands::Precheck { export } => {
            let report = service.precheck(&load_export(&export)?)?;
            print_json(&report)?;
            if !report.is_clean() {
                return Ok(ExitCode::from(2));
            }
        }
        Commands::Import { export } => {
            let outcome = service.import_batch(&load_export(&export)?)?;
            save(&service, &snapshot_path)?;
            print_json(&outcome)?;
        }
        Commands::Check => {
            let report = service.sanity_report()?;
            print_json(&report)?;
            if !report.is_clean() {
                return Ok(ExitCode::from(2));
            }
        }
        Commands::Suggest {
            system,
            source_part_id,
        } => {
            print_json(&service.suggest(system, &source_part_id)?)?;
        }
        Commands::AliasPart {
            system,
            source_part_id,
            canonical,
            color_scope,
        } => {
            let previous = service.set_part_alias(system, &source_part_id, canonical, color_scope)?;
            save(&service, &snapshot_path)?;
            print_json(&serde_json::json!({ "previous": previous }))?;
        }
        Commands::AliasColor {
            system,
            source_color_id,
            canonical,
        } => {
            let previous = service.set_color_alias(system, source_color_id, ColorId(canonical))?;
            save(&service, &snapshot_path)?;
            print_json(&serde_json::json!({ "previous": previous }))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn load_catalog(path: &Path) -> Result<InMemoryCatalog> {
    let bytes = fs::read(path).with_context(|| format!("reading catalog {}", path.display()))?;
    let snapshot: CatalogSnapshot = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    let catalog = InMemoryCatalog::new();
    let summary = catalog.refresh(snapshot);
    tracing::info!(
        parts = summary.parts,
        colors = summary.colors,
        templates = summary.templates_added,
        "catalog loaded"
    );
    Ok(catalog)
}

fn load_export(path: &Path) -> Result<Vec<ForeignLineItem>> {
    let bytes = fs::read(path).with_context(|| format!("reading export {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing export {}", path.display()))
}

fn save(service: &InventoryService<InMemoryCatalog>, path: &Path) -> Result<()> {
    service
        .store()
        .save_json(path)
        .with_context(|| format!("saving snapshot {}", path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
