//! Per-run ingestion counters

use serde::Serialize;
use vitibrasil_common::Domain;

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestionReport {
    pub domain: Domain,
    pub sources_total: usize,
    /// Sources that could not be fetched or did not match the layout
    pub sources_failed: usize,
    pub inserted: usize,
    /// Rows whose natural key was already stored
    pub skipped: usize,
    /// Rows that failed normalization, validation or the write
    pub errored: usize,
    /// Rows structurally omitted (no year, no quantity, or unclassifiable)
    pub dropped: usize,
}

impl IngestionReport {
    pub fn new(domain: Domain) -> Self {
        Self {
            domain,
            sources_total: 0,
            sources_failed: 0,
            inserted: 0,
            skipped: 0,
            errored: 0,
            dropped: 0,
        }
    }

    /// Fold another report for the same domain into this one
    pub fn merge(&mut self, other: &IngestionReport) {
        self.sources_total += other.sources_total;
        self.sources_failed += other.sources_failed;
        self.inserted += other.inserted;
        self.skipped += other.skipped;
        self.errored += other.errored;
        self.dropped += other.dropped;
    }

    /// Every source was fetched and processed
    pub fn is_complete(&self) -> bool {
        self.sources_failed == 0
    }

    pub fn rows_seen(&self) -> usize {
        self.inserted + self.skipped + self.errored + self.dropped
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} inserted, {} skipped, {} errored, {} dropped ({}/{} sources ok)",
            self.domain,
            self.inserted,
            self.skipped,
            self.errored,
            self.dropped,
            self.sources_total - self.sources_failed,
            self.sources_total
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_and_merge() {
        let mut report = IngestionReport::new(Domain::Importation);
        report.sources_total = 2;
        report.inserted = 10;

        let mut other = IngestionReport::new(Domain::Importation);
        other.sources_total = 1;
        other.sources_failed = 1;
        other.errored = 2;

        report.merge(&other);
        assert_eq!(report.sources_total, 3);
        assert!(!report.is_complete());
        assert_eq!(report.rows_seen(), 12);
        assert_eq!(
            report.summary(),
            "importation: 10 inserted, 0 skipped, 2 errored, 0 dropped (2/3 sources ok)"
        );
    }
}
