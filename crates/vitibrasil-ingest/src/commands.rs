//! Command implementations for the `vitibrasil-ingest` binary
//!
//! Domains run one after another; this is the only place that starts
//! pipelines, so two runs of the same domain never overlap within a process.
//! Results are returned to the caller; nothing here writes to stdout.

use crate::config::IngestConfig;
use crate::domains::DomainSpec;
use crate::error::Result;
use crate::pipeline::IngestPipeline;
use crate::report::IngestionReport;
use crate::store::{RecordStore, StoredRecord};
use crate::RunTarget;
use std::sync::Arc;
use tracing::info;
use vitibrasil_common::{Domain, Paginated, PaginationParams};

/// `vitibrasil-ingest run <domain|all>`
pub async fn run(
    config: &IngestConfig,
    store: Arc<dyn RecordStore>,
    target: RunTarget,
) -> Result<Vec<IngestionReport>> {
    let mut reports = Vec::new();

    for domain in target.domains() {
        let pipeline = IngestPipeline::new(DomainSpec::for_domain(domain), config, store.clone())?;
        reports.push(pipeline.ingest().await?);
    }

    if reports.len() > 1 {
        let inserted: usize = reports.iter().map(|r| r.inserted).sum();
        let skipped: usize = reports.iter().map(|r| r.skipped).sum();
        info!(domains = reports.len(), inserted, skipped, "All domains finished");
    }

    Ok(reports)
}

/// `vitibrasil-ingest reingest <domain>`
pub async fn reingest(
    config: &IngestConfig,
    store: Arc<dyn RecordStore>,
    domain: Domain,
) -> Result<IngestionReport> {
    let pipeline = IngestPipeline::new(DomainSpec::for_domain(domain), config, store)?;
    pipeline.reingest().await
}

/// `vitibrasil-ingest list <domain>`: one page of stored records
pub async fn list(
    store: Arc<dyn RecordStore>,
    domain: Domain,
    category: Option<&str>,
    params: PaginationParams,
) -> Result<Paginated<StoredRecord>> {
    store.query(domain, category, &params).await
}
