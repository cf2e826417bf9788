//! Imports by country of origin: quantity (kg) and value (US$)

use super::{DomainSpec, COUNTRY_COLUMN};
use crate::classify::FileIdentity;
use crate::normalize::NumericTarget;
use crate::reshape::TableLayout;
use crate::table::SourceDescriptor;
use vitibrasil_common::Domain;

pub const SOURCES: &[SourceDescriptor] = &[
    SourceDescriptor::new("download/ImpVinhos.csv", b'\t').with_category("vinhos"),
    SourceDescriptor::new("download/ImpEspumantes.csv", b'\t').with_category("espumantes"),
    SourceDescriptor::new("download/ImpFrescas.csv", b'\t').with_category("frescas"),
    SourceDescriptor::new("download/ImpPassas.csv", b'\t').with_category("passas"),
    SourceDescriptor::new("download/ImpSuco.csv", b';').with_category("suco"),
];

pub const LAYOUT: TableLayout = TableLayout {
    entity_column: COUNTRY_COLUMN,
    marker_column: None,
    paired_metric: true,
};

pub fn spec() -> DomainSpec {
    DomainSpec {
        domain: Domain::Importation,
        sources: SOURCES.to_vec(),
        layout: LAYOUT,
        classifier: Box::new(FileIdentity),
        target: NumericTarget::Integer,
    }
}
