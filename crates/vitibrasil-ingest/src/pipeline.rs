//! Ingestion orchestrator
//!
//! One [`IngestPipeline`] per domain drives every source through
//! fetch, reshape, classify, normalize and upsert:
//!
//! 1. Sources are processed in declared order. A source that cannot be
//!    fetched, or whose table lacks the layout's columns, is logged and
//!    counted as failed; the run moves on.
//! 2. Rows are processed sequentially in reshaper order so that each
//!    existence check sees the inserts before it.
//! 3. A row that fails is logged and counted; the run moves on.
//!
//! Only storage failures that make further writes impossible escape
//! [`IngestPipeline::ingest`]. Same-domain runs must be serialized by the
//! caller.

use crate::config::IngestConfig;
use crate::domains::DomainSpec;
use crate::error::{IngestError, Result};
use crate::fetcher::RawFetcher;
use crate::normalize::Normalizer;
use crate::report::IngestionReport;
use crate::reshape;
use crate::store::RecordStore;
use crate::table::{LongRecord, MeltedRow, RawTable, SourceDescriptor};
use crate::upsert::{UpsertOutcome, Upserter};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};

/// What happened to a single melted row
enum RowOutcome {
    Inserted,
    Skipped,
    Dropped(&'static str),
}

pub struct IngestPipeline {
    spec: DomainSpec,
    fetcher: RawFetcher,
    normalizer: Normalizer,
    store: Arc<dyn RecordStore>,
    allow_reingest: bool,
}

impl IngestPipeline {
    pub fn new(spec: DomainSpec, config: &IngestConfig, store: Arc<dyn RecordStore>) -> Result<Self> {
        Ok(Self {
            fetcher: RawFetcher::new(config)?,
            normalizer: Normalizer::new(&config.sentinels),
            spec,
            store,
            allow_reingest: config.allow_reingest,
        })
    }

    /// Run every source once; duplicates are skipped
    pub async fn ingest(&self) -> Result<IngestionReport> {
        let domain = self.spec.domain;

        async {
            info!(sources = self.spec.sources.len(), "Starting ingestion");
            let mut report = IngestionReport::new(domain);

            for source in &self.spec.sources {
                let span = info_span!("source", path = source.path);
                let source_report = async {
                    match self.fetcher.fetch(source).await {
                        Ok(table) => self.ingest_table(source, table).await,
                        Err(e) => {
                            error!(error = %e, "Skipping unavailable source");
                            let mut failed = IngestionReport::new(domain);
                            failed.sources_total = 1;
                            failed.sources_failed = 1;
                            Ok(failed)
                        },
                    }
                }
                .instrument(span)
                .await?;

                report.merge(&source_report);
            }

            info!(
                inserted = report.inserted,
                skipped = report.skipped,
                errored = report.errored,
                dropped = report.dropped,
                sources_failed = report.sources_failed,
                "{}",
                report.summary()
            );

            Ok::<_, IngestError>(report)
        }
        .instrument(info_span!("ingest", domain = %domain))
        .await
    }

    /// Clear the domain, then ingest.
    ///
    /// An interruption between the two leaves the domain empty or partially
    /// populated.
    pub async fn reingest(&self) -> Result<IngestionReport> {
        let domain = self.spec.domain;
        if !self.allow_reingest {
            return Err(IngestError::ReingestDisabled(domain));
        }

        let removed = self.store.delete_all(domain).await?;
        warn!(domain = %domain, removed, "Cleared stored records before reingestion");

        self.ingest().await
    }

    /// Drive an already fetched table through reshape, classify, normalize
    /// and upsert. The returned report covers this one source.
    pub async fn ingest_table(
        &self,
        source: &SourceDescriptor,
        table: RawTable,
    ) -> Result<IngestionReport> {
        let mut report = IngestionReport::new(self.spec.domain);
        report.sources_total = 1;

        let melted = match reshape::melt(&table, &self.spec.layout) {
            Ok(rows) => rows,
            Err(e) => {
                error!(path = source.path, error = %e, "Source does not match the expected layout");
                report.sources_failed = 1;
                return Ok(report);
            },
        };

        debug!(
            path = source.path,
            rows = table.row_count(),
            melted = melted.len(),
            "Reshaped source table"
        );

        for row in &melted {
            match self.ingest_row(source, row).await {
                Ok(RowOutcome::Inserted) => report.inserted += 1,
                Ok(RowOutcome::Skipped) => report.skipped += 1,
                Ok(RowOutcome::Dropped(reason)) => {
                    debug!(reason, row = %row.describe(), "Dropped row");
                    report.dropped += 1;
                },
                Err(e) if e.is_fatal() => {
                    error!(error = %e, "Storage is unavailable, aborting run");
                    return Err(e);
                },
                Err(e) => {
                    warn!(
                        year = %row.year_label,
                        entity = row.entity.as_deref().unwrap_or(""),
                        row = %row.describe(),
                        error = %e,
                        "Failed to ingest row"
                    );
                    report.errored += 1;
                },
            }
        }

        info!(
            path = source.path,
            inserted = report.inserted,
            skipped = report.skipped,
            errored = report.errored,
            dropped = report.dropped,
            "Finished source"
        );

        Ok(report)
    }

    async fn ingest_row(&self, source: &SourceDescriptor, row: &MeltedRow) -> Result<RowOutcome> {
        let Some(year) = row.year() else {
            return Ok(RowOutcome::Dropped("year is not an integer"));
        };
        let Some(raw_quantity) = row.quantity.as_deref() else {
            return Ok(RowOutcome::Dropped("no quantity"));
        };
        let Some(class) = self.spec.classifier.classify(source, row.marker.as_deref()) else {
            return Ok(RowOutcome::Dropped("no category"));
        };

        let entity_key = row
            .entity
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| IngestError::malformed_row(&row.year_label, "", "missing entity"))?;

        let quantity = self
            .normalizer
            .normalize(raw_quantity, self.spec.target)
            .map_err(|e| IngestError::malformed_row(&row.year_label, entity_key, e))?;

        let secondary_value = row
            .secondary
            .as_deref()
            .map(|raw| self.normalizer.normalize(raw, self.spec.target))
            .transpose()
            .map_err(|e| IngestError::malformed_row(&row.year_label, entity_key, e))?;

        let record = LongRecord {
            year,
            entity_key: entity_key.to_string(),
            quantity,
            secondary_value,
            category: class.category.to_string(),
            subcategory: class.subcategory.map(str::to_string),
        };

        match Upserter::upsert(&*self.store, self.spec.domain, &record).await? {
            UpsertOutcome::Inserted(_) => Ok(RowOutcome::Inserted),
            UpsertOutcome::Skipped => Ok(RowOutcome::Skipped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::production;
    use crate::store::SqliteRecordStore;
    use vitibrasil_common::Domain;

    async fn pipeline(spec: DomainSpec) -> (IngestPipeline, Arc<SqliteRecordStore>) {
        let store = Arc::new(SqliteRecordStore::in_memory().await.unwrap());
        let config = IngestConfig::default();
        let pipeline = IngestPipeline::new(spec, &config, store.clone()).unwrap();
        (pipeline, store)
    }

    #[tokio::test]
    async fn test_rows_without_year_quantity_or_category_are_dropped() {
        let (pipeline, store) = pipeline(production::spec()).await;
        let source = production::SOURCES[0];
        let table = RawTable::from_delimited(
            source.path,
            "produto;control;2019;2020\nTinto;vm_Tinto;5;\nTOTAL;TOTAL;9;9\n",
            b';',
        )
        .unwrap();

        let report = pipeline.ingest_table(&source, table).await.unwrap();
        // Tinto/2019 stored; Tinto/2020 has no quantity; TOTAL has no category
        assert_eq!(report.inserted, 1);
        assert_eq!(report.dropped, 3);
        assert_eq!(report.errored, 0);
        assert_eq!(store.count(Domain::Production, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_short_rows_are_counted_not_fatal() {
        let (pipeline, _store) = pipeline(production::spec()).await;
        let source = production::SOURCES[0];
        let table = RawTable {
            path: source.path.to_string(),
            headers: vec!["produto".into(), "control".into(), "2020".into()],
            rows: vec![vec![Some("A".into())]],
        };

        let report = pipeline.ingest_table(&source, table).await.unwrap();
        assert_eq!(report.rows_seen(), 1);
        assert_eq!(report.dropped, 1);
        assert_eq!(report.sources_failed, 0);
    }

    #[tokio::test]
    async fn test_layout_mismatch_fails_the_source() {
        let (pipeline, _store) = pipeline(production::spec()).await;
        let source = production::SOURCES[0];
        let table = RawTable::from_delimited(source.path, "nome;2020\nx;1\n", b';').unwrap();

        let report = pipeline.ingest_table(&source, table).await.unwrap();
        assert_eq!(report.sources_failed, 1);
        assert_eq!(report.rows_seen(), 0);
    }

    #[tokio::test]
    async fn test_reingest_is_refused_by_default() {
        let (pipeline, _store) = pipeline(production::spec()).await;
        let err = pipeline.reingest().await.unwrap_err();
        assert!(matches!(err, IngestError::ReingestDisabled(Domain::Production)));
    }
}
