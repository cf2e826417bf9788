//! Domestic commercialization of wines and derivatives (litres)

use super::DomainSpec;
use crate::classify::MarkerPrefix;
use crate::normalize::NumericTarget;
use crate::reshape::TableLayout;
use crate::table::SourceDescriptor;
use vitibrasil_common::Domain;

pub const SOURCES: &[SourceDescriptor] = &[SourceDescriptor::new("download/Comercio.csv", b';')];

pub const LAYOUT: TableLayout = TableLayout {
    entity_column: &["produto"],
    marker_column: Some("control"),
    paired_metric: false,
};

/// Control codes shared with the production table
pub const CATEGORY_PREFIXES: &[(&str, &str)] = &[
    ("vm_", "vinho-de-mesa"),
    ("vv_", "vinho-fino-de-mesa"),
];

/// Group labels and every other product line
pub const FALLBACK_CATEGORY: &str = "outros";

pub fn spec() -> DomainSpec {
    DomainSpec {
        domain: Domain::Commercialization,
        sources: SOURCES.to_vec(),
        layout: LAYOUT,
        classifier: Box::new(
            MarkerPrefix::new(CATEGORY_PREFIXES).with_fallback(FALLBACK_CATEGORY),
        ),
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
            spec.classifier.classify(source, Some("vv_Tinto")),
            Some(Classification::category("vinho-fino-de-mesa"))
        );
        assert_eq!(
            spec.classifier.classify(source, Some("vm_Rosado")),
            Some(Classification::category("vinho-de-mesa"))
        );
        // nothing in this table is dropped for lack of a category
        for marker in [Some("VINHO FRIZANTE"), Some("ve_Tinto"), None] {
            assert_eq!(
                spec.classifier.classify(source, marker),
                Some(Classification::category(FALLBACK_CATEGORY))
            );
        }
    }
}
