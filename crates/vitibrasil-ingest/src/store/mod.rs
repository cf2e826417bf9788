//! Record storage
//!
//! The pipeline only needs [`RecordStore::exists`], [`RecordStore::insert`]
//! and [`RecordStore::delete_all`]; `count` and `query` serve the read side
//! (the `list` command and tests).

pub mod sqlite;

pub use sqlite::SqliteRecordStore;

use crate::error::{IngestError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vitibrasil_common::{Domain, Paginated, PaginationParams};

/// Uniqueness key of a stored record within its domain
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NaturalKey {
    pub domain: Domain,
    pub year: i32,
    pub entity_key: String,
    pub category: String,
    pub subcategory: Option<String>,
}

/// A record ready to be written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRecord {
    pub domain: Domain,
    pub year: i32,
    pub entity_key: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub quantity: f64,
    pub secondary_value: Option<f64>,
}

impl NewRecord {
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey {
            domain: self.domain,
            year: self.year,
            entity_key: self.entity_key.clone(),
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.entity_key.trim().is_empty() {
            return Err(IngestError::Validation("entity key cannot be empty".to_string()));
        }
        if !(1000..=9999).contains(&self.year) {
            return Err(IngestError::Validation(format!(
                "year {} is not a four-digit year",
                self.year
            )));
        }
        if self.category.is_empty() {
            return Err(IngestError::Validation("category cannot be empty".to_string()));
        }
        if matches!(self.subcategory.as_deref(), Some("")) {
            return Err(IngestError::Validation(
                "subcategory must be absent rather than empty".to_string(),
            ));
        }
        if !self.quantity.is_finite() {
            return Err(IngestError::Validation(format!(
                "quantity {} is not finite",
                self.quantity
            )));
        }
        if let Some(value) = self.secondary_value {
            if !value.is_finite() {
                return Err(IngestError::Validation(format!(
                    "secondary value {} is not finite",
                    value
                )));
            }
        }
        Ok(())
    }
}

/// A persisted record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: i64,
    pub domain: Domain,
    pub year: i32,
    pub entity_key: String,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_value: Option<f64>,
    pub ingested_at: DateTime<Utc>,
}

/// Result of an insert attempt
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome {
    Inserted(StoredRecord),
    /// A record with the same natural key already exists
    AlreadyPresent,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn exists(&self, key: &NaturalKey) -> Result<bool>;

    /// Insert unless the natural key is taken; never double-inserts
    async fn insert(&self, record: &NewRecord) -> Result<InsertOutcome>;

    /// Remove every record of `domain`, returning how many were removed
    async fn delete_all(&self, domain: Domain) -> Result<u64>;

    async fn count(&self, domain: Domain, category: Option<&str>) -> Result<i64>;

    async fn query(
        &self,
        domain: Domain,
        category: Option<&str>,
        params: &PaginationParams,
    ) -> Result<Paginated<StoredRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> NewRecord {
        NewRecord {
            domain: Domain::Production,
            year: 2020,
            entity_key: "Tinto".to_string(),
            category: "vinho-de-mesa".to_string(),
            subcategory: None,
            quantity: 10.0,
            secondary_value: None,
        }
    }

    #[test]
    fn test_valid_record() {
        assert!(record().validate().is_ok());
    }

    #[test]
    fn test_invalid_records() {
        let mut r = record();
        r.entity_key = "  ".to_string();
        assert!(r.validate().is_err());

        let mut r = record();
        r.year = 20;
        assert!(r.validate().is_err());

        let mut r = record();
        r.subcategory = Some(String::new());
        assert!(r.validate().is_err());

        let mut r = record();
        r.secondary_value = Some(f64::NAN);
        assert!(r.validate().is_err());
    }

    #[test]
    fn test_natural_key_includes_subcategory() {
        let mut a = record();
        a.subcategory = Some("tintas".to_string());
        let b = record();
        assert_ne!(a.natural_key(), b.natural_key());
    }
}
