#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for schema setup and infrastructure data loading.

use std::path::PathBuf;
use std::time::Instant;

use clap::{Parser, Subcommand};
use mirror_database::{db, run_migrations};
use mirror_infrastructure_models::InfrastructureCategory;

#[derive(Parser)]
#[command(name = "mirror_ingest", about = "Infrastructure data loader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load one `GeoJSON` `FeatureCollection` into a category table
    Load {
        /// Target category: airports, ports or warehouses
        #[arg(long)]
        category: InfrastructureCategory,
        /// Path to the `GeoJSON` file
        #[arg(long)]
        file: PathBuf,
    },
    /// Load the default file of every category from a directory
    LoadAll {
        /// Directory holding the `la_*_infrastructure.geojson` files
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    let db = db::connect_from_env().await?;
    run_migrations(db.as_ref()).await?;

    match cli.command {
        Commands::Migrate => {
            log::info!("Migrations complete.");
        }
        Commands::Load { category, file } => {
            let summary = mirror_ingest::load_file(db.as_ref(), category, &file).await?;
            println!(
                "{category}: inserted {} of {} features ({} skipped)",
                summary.inserted, summary.total, summary.skipped
            );
        }
        Commands::LoadAll { data_dir } => {
            let start = Instant::now();
            let results = mirror_ingest::load_all(db.as_ref(), &data_dir).await?;
            for (category, summary) in &results {
                println!(
                    "{category}: inserted {} of {} features ({} skipped)",
                    summary.inserted, summary.total, summary.skipped
                );
            }
            log::info!(
                "Loaded {} file(s) in {:.1}s",
                results.len(),
                start.elapsed().as_secs_f64()
            );
        }
    }

    Ok(())
}
