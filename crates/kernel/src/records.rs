//! Postgres-backed record storage for plugin data.

use async_trait::async_trait;
use sqlx::PgPool;
use tessera_sdk::{Record, RecordError, RecordSource};
use uuid::Uuid;

/// A row from the `site_record` table.
#[derive(Debug, sqlx::FromRow)]
struct SiteRecordRow {
    id: Uuid,
    data: serde_json::Value,
    published: bool,
    weight: i32,
    changed: i64,
}

impl From<SiteRecordRow> for Record {
    fn from(row: SiteRecordRow) -> Self {
        Self {
            id: row.id,
            data: row.data,
            published: row.published,
            weight: row.weight,
            changed: row.changed,
        }
    }
}

fn backend(e: sqlx::Error) -> RecordError {
    RecordError::Backend(e.to_string())
}

/// Record source backed by the `site_record` table.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace a record in a site's collection.
    pub async fn upsert(
        &self,
        site_id: Uuid,
        collection: &str,
        record: &Record,
    ) -> Result<(), RecordError> {
        sqlx::query(
            r#"
            INSERT INTO site_record (id, site_id, collection, data, published, weight, changed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id)
            DO UPDATE SET data = $4, published = $5, weight = $6, changed = $7
            "#,
        )
        .bind(record.id)
        .bind(site_id)
        .bind(collection)
        .bind(&record.data)
        .bind(record.published)
        .bind(record.weight)
        .bind(record.changed)
        .execute(&self.pool)
        .await
        .map_err(backend)?;

        Ok(())
    }
}

#[async_trait]
impl RecordSource for PgRecordStore {
    async fn list(&self, site_id: Uuid, collection: &str) -> Result<Vec<Record>, RecordError> {
        let rows = sqlx::query_as::<_, SiteRecordRow>(
            "SELECT id, data, published, weight, changed FROM site_record \
             WHERE site_id = $1 AND collection = $2 ORDER BY weight, changed",
        )
        .bind(site_id)
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        Ok(rows.into_iter().map(Record::from).collect())
    }
}
