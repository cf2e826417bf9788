//! Per-domain ingestion strategies
//!
//! Every domain runs the same fetch, reshape, classify, normalize and upsert
//! steps. A [`DomainSpec`] supplies what differs: the source files, the
//! table layout, the classifier and the numeric target.
//!
//! Records are keyed by `(domain, year, entity_key, category, subcategory)`
//! in every domain.

pub mod commercialization;
pub mod exportation;
pub mod importation;
pub mod processing;
pub mod production;

use crate::classify::Classify;
use crate::normalize::NumericTarget;
use crate::reshape::TableLayout;
use crate::table::SourceDescriptor;
use vitibrasil_common::Domain;

/// Entity column names used by the country-keyed trade tables
pub(crate) const COUNTRY_COLUMN: &[&str] = &["país", "pais"];

/// Everything that makes one domain's pipeline distinct
pub struct DomainSpec {
    pub domain: Domain,
    /// Processed in this order
    pub sources: Vec<SourceDescriptor>,
    pub layout: TableLayout,
    pub classifier: Box<dyn Classify>,
    pub target: NumericTarget,
}

impl DomainSpec {
    pub fn for_domain(domain: Domain) -> Self {
        match domain {
            Domain::Production => production::spec(),
            Domain::Processing => processing::spec(),
            Domain::Commercialization => commercialization::spec(),
            Domain::Importation => importation::spec(),
            Domain::Exportation => exportation::spec(),
        }
    }

    /// Same spec reading from different sources, e.g. for a fixture server
    pub fn with_sources(mut self, sources: Vec<SourceDescriptor>) -> Self {
        self.sources = sources;
        self
    }
}

impl std::fmt::Debug for DomainSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainSpec")
            .field("domain", &self.domain)
            .field("sources", &self.sources)
            .field("layout", &self.layout)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
