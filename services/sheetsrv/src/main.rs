//! sheetsrv - Sheet Reconciler
//!
//! Runs the HTTP API by default; `import`, `export` and `check` run once and
//! exit.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sheetsrv::bootstrap;
use sheetsrv::SheetsrvConfig;
use tracing::error;

#[derive(Parser, Debug)]
#[command(author, version, about = "sheetsrv - podcast outreach sheet reconciler")]
struct Args {
    /// Configuration file (default: config/sheetsrv.yaml)
    #[arg(short, long, value_name = "FILE", env = "SHEETSRV_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Import every sheet row into the database and print the report
    Import,
    /// Export every database record to the sheet and print the report
    Export,
    /// Validate configuration and database connectivity
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let service_info = bootstrap::create_service_info();

    let config = bootstrap::load_configuration(args.config.as_deref())?;
    bootstrap::init_environment(&service_info, &config)?;

    let result = match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Import => import(config).await,
        Commands::Export => export(config).await,
        Commands::Check => check(config).await,
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    result
}

async fn serve(config: SheetsrvConfig) -> anyhow::Result<()> {
    config.validate()?;
    let state = bootstrap::build_state(config).await?;
    bootstrap::start_server(state).await?;
    Ok(())
}

async fn import(config: SheetsrvConfig) -> anyhow::Result<()> {
    config.validate()?;
    let state = bootstrap::build_state(config).await?;
    let report = state.reconciler.import_all().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn export(config: SheetsrvConfig) -> anyhow::Result<()> {
    config.validate()?;
    let state = bootstrap::build_state(config).await?;
    let report = state.reconciler.export_all().await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn check(config: SheetsrvConfig) -> anyhow::Result<()> {
    println!("=== sheetsrv configuration check ===\n");

    match config.validate() {
        Ok(()) => println!("✓ Configuration valid"),
        Err(e) => {
            println!("✗ Configuration invalid: {}", e);
            return Err(e.into());
        },
    }

    println!("\n--- Service ---");
    println!("Listen: {}:{}", config.service.host, config.service.port);
    println!("Database: {}", config.database.path.display());
    println!("Sheet: {} / {}", config.grid.spreadsheet_id, config.grid.sheet_name);
    println!("Request timeout: {:?}", config.grid.request_timeout);

    let store = sheetsrv::SqliteStore::open(&config.database.path).await?;
    match store.client().ping().await {
        Ok(()) => println!("✓ Database reachable"),
        Err(e) => {
            println!("✗ Database unreachable: {}", e);
            return Err(e);
        },
    }

    Ok(())
}
