//! Vitibrasil ingestion - main entry point

use clap::Parser;
use std::process;
use std::sync::Arc;
use tracing::error;
use vitibrasil_common::logging::init_logging;
use vitibrasil_common::PaginationParams;
use vitibrasil_ingest::{commands, Cli, Commands, IngestConfig, RecordStore, SqliteRecordStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // The CLI still works without logging
    let _ = init_logging(&cli.log_config());

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn execute_command(cli: &Cli) -> anyhow::Result<()> {
    let config = IngestConfig::from_env()?;
    let store: Arc<dyn RecordStore> = Arc::new(SqliteRecordStore::connect(&config.database).await?);

    match &cli.command {
        Commands::Run { target } => {
            let reports = commands::run(&config, store, *target).await?;
            for report in &reports {
                println!("{}", report.summary());
            }
            if reports.iter().any(|r| !r.is_complete()) {
                tracing::warn!("Some sources could not be ingested; see the log for details");
            }
        },
        Commands::Reingest { domain } => {
            let report = commands::reingest(&config, store, *domain).await?;
            println!("{}", report.summary());
        },
        Commands::List {
            domain,
            category,
            page,
            per_page,
        } => {
            let params = PaginationParams::new(Some(*page), Some(*per_page));
            let page = commands::list(store, *domain, category.as_deref(), params).await?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        },
    }

    Ok(())
}
