//! Insert-or-skip by natural key

use crate::error::Result;
use crate::store::{InsertOutcome, NewRecord, RecordStore, StoredRecord};
use crate::table::LongRecord;
use tracing::debug;
use vitibrasil_common::Domain;

#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    Inserted(StoredRecord),
    /// Natural key already stored; nothing written
    Skipped,
}

pub struct Upserter;

impl Upserter {
    /// Existence check, then insert.
    ///
    /// The store's own conflict handling turns a lost race between the two
    /// steps into a skip as well.
    pub async fn upsert(
        store: &dyn RecordStore,
        domain: Domain,
        record: &LongRecord,
    ) -> Result<UpsertOutcome> {
        let new_record = NewRecord {
            domain,
            year: record.year,
            entity_key: record.entity_key.clone(),
            category: record.category.clone(),
            subcategory: record.subcategory.clone(),
            quantity: record.quantity,
            secondary_value: record.secondary_value,
        };
        new_record.validate()?;

        if store.exists(&new_record.natural_key()).await? {
            debug!(
                domain = %domain,
                year = record.year,
                entity = %record.entity_key,
                category = %record.category,
                "Record already stored, skipping"
            );
            return Ok(UpsertOutcome::Skipped);
        }

        match store.insert(&new_record).await? {
            InsertOutcome::Inserted(stored) => Ok(UpsertOutcome::Inserted(stored)),
            InsertOutcome::AlreadyPresent => Ok(UpsertOutcome::Skipped),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteRecordStore;

    fn long(category: &str) -> LongRecord {
        LongRecord {
            year: 2020,
            entity_key: "Tinto".to_string(),
            quantity: 1000.0,
            secondary_value: None,
            category: category.to_string(),
            subcategory: None,
        }
    }

    #[tokio::test]
    async fn test_insert_then_skip() {
        let store = SqliteRecordStore::in_memory().await.unwrap();

        let first = Upserter::upsert(&store, Domain::Production, &long("vinho-de-mesa"))
            .await
            .unwrap();
        assert!(matches!(first, UpsertOutcome::Inserted(ref r) if r.quantity == 1000.0));

        let second = Upserter::upsert(&store, Domain::Production, &long("vinho-de-mesa"))
            .await
            .unwrap();
        assert_eq!(second, UpsertOutcome::Skipped);
    }

    #[tokio::test]
    async fn test_same_key_in_other_domain_is_not_a_duplicate() {
        let store = SqliteRecordStore::in_memory().await.unwrap();

        Upserter::upsert(&store, Domain::Production, &long("suco")).await.unwrap();
        let other = Upserter::upsert(&store, Domain::Commercialization, &long("suco"))
            .await
            .unwrap();
        assert!(matches!(other, UpsertOutcome::Inserted(_)));
    }

    #[tokio::test]
    async fn test_invalid_record_is_rejected_before_storage() {
        let store = SqliteRecordStore::in_memory().await.unwrap();
        let mut record = long("suco");
        record.entity_key = String::new();

        assert!(Upserter::upsert(&store, Domain::Production, &record).await.is_err());
        assert_eq!(store.count(Domain::Production, None).await.unwrap(), 0);
    }
}
