//! Exports by destination country: quantity (kg) and value (US$)

use super::{DomainSpec, COUNTRY_COLUMN};
use crate::classify::FileIdentity;
use crate::normalize::NumericTarget;
use crate::reshape::TableLayout;
use crate::table::SourceDescriptor;
use vitibrasil_common::Domain;

pub const SOURCES: &[SourceDescriptor] = &[
    SourceDescriptor::new("download/ExpVinho.csv", b'\t').with_category("vinho"),
    SourceDescriptor::new("download/ExpEspumantes.csv", b'\t').with_category("espumantes"),
    SourceDescriptor::new("download/ExpUva.csv", b'\t').with_category("uva"),
    SourceDescriptor::new("download/ExpSuco.csv", b'\t').with_category("suco"),
];

pub const LAYOUT: TableLayout = TableLayout {
    entity_column: COUNTRY_COLUMN,
    marker_column: None,
    paired_metric: true,
};

pub fn spec() -> DomainSpec {
    DomainSpec {
        domain: Domain::Exportation,
        sources: SOURCES.to_vec(),
        layout: LAYOUT,
        classifier: Box::new(FileIdentity),
        target: NumericTarget::Float,
    }
}
