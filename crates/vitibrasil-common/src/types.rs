//! Common types used across Vitibrasil

use serde::{Deserialize, Serialize};

/// Statistical domain published by the vitiviniculture source
///
/// Each domain has its own set of source files and its own partition of the
/// record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Production,
    Processing,
    Commercialization,
    Importation,
    Exportation,
}

impl Domain {
    /// All domains, in the order a full run processes them
    pub const ALL: [Domain; 5] = [
        Domain::Production,
        Domain::Processing,
        Domain::Commercialization,
        Domain::Importation,
        Domain::Exportation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Production => "production",
            Domain::Processing => "processing",
            Domain::Commercialization => "commercialization",
            Domain::Importation => "importation",
            Domain::Exportation => "exportation",
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "production" => Ok(Domain::Production),
            "processing" => Ok(Domain::Processing),
            "commercialization" => Ok(Domain::Commercialization),
            "importation" => Ok(Domain::Importation),
            "exportation" => Ok(Domain::Exportation),
            other => Err(format!(
                "unknown domain '{}' (expected one of: production, processing, commercialization, importation, exportation)",
                other
            )),
        }
    }
}

// ============================================================================
// Pagination
// ============================================================================

/// Default page size for record listings
pub const DEFAULT_PER_PAGE: i64 = 100;

/// Largest page size a caller may request
pub const MAX_PER_PAGE: i64 = 1000;

/// Page request (1-indexed)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    /// Page number, defaulting to 1
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Items per page, defaulting to 100 and clamped to 1..=1000
    pub fn per_page(&self) -> i64 {
        self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE)
    }

    /// Offset for the SQL OFFSET clause
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.per_page()
    }
}

/// One page of results plus the totals needed to navigate the rest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, params: &PaginationParams) -> Self {
        let page = params.page();
        let per_page = params.per_page();
        let total_pages = (total + per_page - 1) / per_page;

        Self {
            data,
            total,
            page,
            per_page,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_round_trips_through_str() {
        for domain in Domain::ALL {
            assert_eq!(domain.as_str().parse::<Domain>().unwrap(), domain);
        }
        assert_eq!(" Exportation ".parse::<Domain>().unwrap(), Domain::Exportation);
        assert!("weather".parse::<Domain>().is_err());
    }

    #[test]
    fn test_domain_serializes_lowercase() {
        let json = serde_json::to_string(&Domain::Commercialization).unwrap();
        assert_eq!(json, "\"commercialization\"");
    }

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 100);
        assert_eq!(params.offset(), 0);

        let params = PaginationParams::new(Some(0), Some(5000));
        assert_eq!(params.page(), 1);
        assert_eq!(params.per_page(), 1000);

        let params = PaginationParams::new(Some(3), Some(20));
        assert_eq!(params.offset(), 40);
    }

    #[test]
    fn test_paginated_metadata() {
        let params = PaginationParams::new(Some(2), Some(10));
        let page = Paginated::new(vec![1, 2, 3], 23, &params);
        assert_eq!(page.total_pages, 3);
        assert!(page.has_next);
        assert!(page.has_prev);

        let empty: Paginated<i32> = Paginated::new(vec![], 0, &PaginationParams::default());
        assert_eq!(empty.total_pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }
}
