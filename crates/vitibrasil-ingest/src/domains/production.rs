//! Production of wines, juices and derivatives (litres)

use super::DomainSpec;
use crate::classify::MarkerPrefix;
use crate::normalize::NumericTarget;
use crate::reshape::TableLayout;
use crate::table::SourceDescriptor;
use vitibrasil_common::Domain;

pub const SOURCES: &[SourceDescriptor] = &[SourceDescriptor::new("download/Producao.csv", b';')];

pub const LAYOUT: TableLayout = TableLayout {
    entity_column: &["produto"],
    marker_column: Some("control"),
    paired_metric: false,
};

pub const CATEGORY_PREFIXES: &[(&str, &str)] = &[
    ("vm_", "vinho-de-mesa"),
    ("vv_", "vinho-fino-de-mesa-vinifera"),
    ("su_", "suco"),
    ("de_", "derivados"),
];

pub fn spec() -> DomainSpec {
    DomainSpec {
        domain: Domain::Production,
        sources: SOURCES.to_vec(),
        layout: LAYOUT,
        classifier: Box::new(MarkerPrefix::new(CATEGORY_PREFIXES)),
        target: NumericTarget::Integer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;

    #[test]
    fn test_marker_categories() {
        let spec = spec();
        let source = &spec.sources[0];
        assert_eq!(
            spec.classifier.classify(source, Some("vm_Tinto")),
            Some(Classification::category("vinho-de-mesa"))
        );
        assert_eq!(
            spec.classifier.classify(source, Some("de_Vinagre")),
            Some(Classification::category("derivados"))
        );
        // top-level totals carry bare codes such as "VINHO DE MESA"
        assert_eq!(spec.classifier.classify(source, Some("VINHO DE MESA")), None);
    }
}
