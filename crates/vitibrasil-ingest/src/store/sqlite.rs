//! SQLite-backed record store
//!
//! All domains share the `statistics` table. A unique index over the natural
//! key backs up the pipeline's existence check, and inserts use
//! `ON CONFLICT DO NOTHING` so a concurrent writer can never produce a
//! duplicate.

use super::{InsertOutcome, NaturalKey, NewRecord, RecordStore, StoredRecord};
use crate::config::DatabaseConfig;
use crate::error::{IngestError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};
use vitibrasil_common::{Domain, Paginated, PaginationParams};

const RECORD_COLUMNS: &str =
    "id, domain, year, entity_key, category, subcategory, quantity, secondary_value, ingested_at";

#[derive(Debug, sqlx::FromRow)]
struct StatisticRow {
    id: i64,
    domain: String,
    year: i32,
    entity_key: String,
    category: String,
    subcategory: Option<String>,
    quantity: f64,
    secondary_value: Option<f64>,
    ingested_at: DateTime<Utc>,
}

impl TryFrom<StatisticRow> for StoredRecord {
    type Error = IngestError;

    fn try_from(row: StatisticRow) -> Result<Self> {
        let domain = row
            .domain
            .parse::<Domain>()
            .map_err(IngestError::Validation)?;

        Ok(StoredRecord {
            id: row.id,
            domain,
            year: row.year,
            entity_key: row.entity_key,
            category: row.category,
            subcategory: row.subcategory,
            quantity: row.quantity,
            secondary_value: row.secondary_value,
            ingested_at: row.ingested_at,
        })
    }
}

/// Record store with SQLite backend
#[derive(Debug, Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Open (creating if needed) the database and run migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)?.create_if_missing(true);

        // Each connection to an in-memory database sees its own database.
        let max_connections = if config.url.contains(":memory:") {
            1
        } else {
            config.max_connections
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect_with(options)
            .await?;

        info!(url = %config.url, max_connections, "Connected to record store");

        Self::from_pool(pool).await
    }

    /// Fresh private in-memory database
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, running migrations first
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn exists(&self, key: &NaturalKey) -> Result<bool> {
        let found: i64 = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM statistics
                WHERE domain = ?1 AND year = ?2 AND entity_key = ?3
                  AND category = ?4 AND subcategory IS ?5
            )
            "#,
        )
        .bind(key.domain.as_str())
        .bind(key.year)
        .bind(&key.entity_key)
        .bind(&key.category)
        .bind(key.subcategory.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(found != 0)
    }

    async fn insert(&self, record: &NewRecord) -> Result<InsertOutcome> {
        record.validate()?;

        let sql = format!(
            r#"
            INSERT INTO statistics
                (domain, year, entity_key, category, subcategory, quantity, secondary_value, ingested_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT DO NOTHING
            RETURNING {}
            "#,
            RECORD_COLUMNS
        );

        let row = sqlx::query_as::<_, StatisticRow>(&sql)
            .bind(record.domain.as_str())
            .bind(record.year)
            .bind(&record.entity_key)
            .bind(&record.category)
            .bind(record.subcategory.as_deref())
            .bind(record.quantity)
            .bind(record.secondary_value)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(InsertOutcome::Inserted(row.try_into()?)),
            None => {
                debug!(
                    domain = %record.domain,
                    year = record.year,
                    entity = %record.entity_key,
                    "Insert hit an existing natural key"
                );
                Ok(InsertOutcome::AlreadyPresent)
            },
        }
    }

    async fn delete_all(&self, domain: Domain) -> Result<u64> {
        let result = sqlx::query("DELETE FROM statistics WHERE domain = ?1")
            .bind(domain.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count(&self, domain: Domain, category: Option<&str>) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM statistics
            WHERE domain = ?1 AND (?2 IS NULL OR category = ?2)
            "#,
        )
        .bind(domain.as_str())
        .bind(category)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    async fn query(
        &self,
        domain: Domain,
        category: Option<&str>,
        params: &PaginationParams,
    ) -> Result<Paginated<StoredRecord>> {
        let total = self.count(domain, category).await?;

        let sql = format!(
            r#"
            SELECT {}
            FROM statistics
            WHERE domain = ?1 AND (?2 IS NULL OR category = ?2)
            ORDER BY year DESC, entity_key, id
            LIMIT ?3 OFFSET ?4
            "#,
            RECORD_COLUMNS
        );

        let rows = sqlx::query_as::<_, StatisticRow>(&sql)
            .bind(domain.as_str())
            .bind(category)
            .bind(params.per_page())
            .bind(params.offset())
            .fetch_all(&self.pool)
            .await?;

        let data = rows
            .into_iter()
            .map(StoredRecord::try_from)
            .collect::<Result<Vec<_>>>()?;

        Ok(Paginated::new(data, total, params))
    }
}
