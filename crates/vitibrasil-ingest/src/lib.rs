//! Vitibrasil ingestion pipeline
//!
//! Loads the vitiviniculture statistics published as wide CSV files (one row
//! per product, cultivar or country, one column per year) into a long-format
//! record store.
//!
//! # Overview
//!
//! - **Fetch** ([`fetcher`]): local cache, else one bounded HTTP GET; Latin-1 decode
//! - **Reshape** ([`reshape`]): wide to long, pairing `YYYY.1` value columns
//! - **Classify** ([`classify`]): category from the file or the row's control code
//! - **Normalize** ([`normalize`]): decimal commas and "not informed" tokens
//! - **Upsert** ([`upsert`], [`store`]): insert unless the natural key exists
//! - **Orchestrate** ([`pipeline`], [`domains`]): one pipeline per domain
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use vitibrasil_common::Domain;
//! use vitibrasil_ingest::{DomainSpec, IngestConfig, IngestPipeline, SqliteRecordStore};
//!
//! # async fn example() -> vitibrasil_ingest::Result<()> {
//! let config = IngestConfig::from_env()?;
//! let store = Arc::new(SqliteRecordStore::connect(&config.database).await?);
//! let pipeline = IngestPipeline::new(DomainSpec::for_domain(Domain::Production), &config, store)?;
//! let report = pipeline.ingest().await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

pub mod classify;
pub mod commands;
pub mod config;
pub mod domains;
pub mod error;
pub mod fetcher;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod reshape;
pub mod store;
pub mod table;
pub mod upsert;

// Re-export commonly used types
pub use config::IngestConfig;
pub use domains::DomainSpec;
pub use error::{IngestError, Result};
pub use pipeline::IngestPipeline;
pub use report::IngestionReport;
pub use store::{RecordStore, SqliteRecordStore};

use clap::{Parser, Subcommand};
use vitibrasil_common::logging::{LogConfig, LogLevel};
use vitibrasil_common::Domain;

/// Vitibrasil statistics ingestion
#[derive(Parser, Debug)]
#[command(name = "vitibrasil-ingest")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Logging settings for this invocation.
    ///
    /// `.env` is loaded first so that `LOG_*` entries in it, like real
    /// environment variables, take precedence over `--verbose`.
    pub fn log_config(&self) -> LogConfig {
        dotenvy::dotenv().ok();

        let level = if self.verbose { LogLevel::Debug } else { LogLevel::Info };
        let config = LogConfig::builder()
            .level(level)
            .log_file_prefix("vitibrasil-ingest")
            .build();

        config.clone().merge_env().unwrap_or(config)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ingest one domain, or all of them in order
    Run {
        /// production, processing, commercialization, importation, exportation or all
        target: RunTarget,
    },

    /// Clear a domain and ingest it again (requires ALLOW_REINGEST=true)
    Reingest {
        domain: Domain,
    },

    /// Print a page of stored records as JSON
    List {
        domain: Domain,

        /// Only records of this category
        #[arg(short, long)]
        category: Option<String>,

        /// Page number (1-indexed)
        #[arg(long, default_value_t = 1)]
        page: i64,

        /// Records per page (at most 1000)
        #[arg(long, default_value_t = vitibrasil_common::types::DEFAULT_PER_PAGE)]
        per_page: i64,
    },
}

/// Argument of the `run` command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunTarget {
    All,
    One(Domain),
}

impl RunTarget {
    pub fn domains(&self) -> Vec<Domain> {
        match self {
            RunTarget::All => Domain::ALL.to_vec(),
            RunTarget::One(domain) => vec![*domain],
        }
    }
}

impl std::str::FromStr for RunTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(RunTarget::All)
        } else {
            s.parse().map(RunTarget::One)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_target_parsing() {
        assert_eq!("all".parse::<RunTarget>().unwrap(), RunTarget::All);
        assert_eq!(
            "importation".parse::<RunTarget>().unwrap(),
            RunTarget::One(Domain::Importation)
        );
        assert!("vinhos".parse::<RunTarget>().is_err());
        assert_eq!(RunTarget::All.domains(), Domain::ALL.to_vec());
    }

    #[test]
    fn test_cli_parses_list_options() {
        let cli = Cli::try_parse_from([
            "vitibrasil-ingest",
            "list",
            "processing",
            "--category",
            "vinifera",
            "--per-page",
            "50",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Commands::List {
                domain,
                category,
                page,
                per_page,
            } => {
                assert_eq!(domain, Domain::Processing);
                assert_eq!(category.as_deref(), Some("vinifera"));
                assert_eq!(page, 1);
                assert_eq!(per_page, 50);
            },
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_verifies() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
