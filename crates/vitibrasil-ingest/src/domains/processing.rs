//! Grapes processed by the wineries (kg), split by grape class

use super::DomainSpec;
use crate::classify::FileWithMarkerSubcategory;
use crate::normalize::NumericTarget;
use crate::reshape::TableLayout;
use crate::table::SourceDescriptor;
use vitibrasil_common::Domain;

pub const SOURCES: &[SourceDescriptor] = &[
    SourceDescriptor::new("download/ProcessaViniferas.csv", b';').with_category("vinifera"),
    SourceDescriptor::new("download/ProcessaAmericanas.csv", b'\t').with_category("americanas"),
    SourceDescriptor::new("download/ProcessaMesa.csv", b'\t').with_category("mesa"),
    SourceDescriptor::new("download/ProcessaSemclass.csv", b'\t')
        .with_category("sem-classificacao"),
];

pub const LAYOUT: TableLayout = TableLayout {
    entity_column: &["cultivar"],
    marker_column: Some("control"),
    paired_metric: false,
};

const RED_AND_WHITE_ROSE: &[(&str, &str)] = &[("ti_", "tintas"), ("br_", "brancas-e-rosadas")];

const RED_AND_WHITE: &[(&str, &str)] = &[("ti_", "tintas"), ("br_", "brancas")];

pub fn spec() -> DomainSpec {
    let classifier = FileWithMarkerSubcategory::new()
        .with_table("vinifera", RED_AND_WHITE_ROSE)
        .with_table("americanas", RED_AND_WHITE_ROSE)
        .with_table("mesa", RED_AND_WHITE)
        .with_optional("sem-classificacao");

    DomainSpec {
        domain: Domain::Processing,
        sources: SOURCES.to_vec(),
        layout: LAYOUT,
        classifier: Box::new(classifier),
        target: NumericTarget::Integer,
    }
}
