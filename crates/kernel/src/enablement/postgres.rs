use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{EnablementError, EnablementRecord, EnablementStore};

/// A row from the `site_plugin` table.
#[derive(Debug, sqlx::FromRow)]
struct SitePluginRow {
    system_name: String,
    enabled: bool,
    configuration: Option<String>,
}

/// Enablement store backed by the `site_plugin` table.
#[derive(Debug, Clone)]
pub struct PgEnablementStore {
    pool: PgPool,
}

impl PgEnablementStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Enable or disable a plugin for a site, replacing its configuration.
    pub async fn upsert(&self, site_id: Uuid, record: &EnablementRecord) -> Result<(), EnablementError> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query(
            r#"
            INSERT INTO site_plugin (site_id, system_name, enabled, configuration, created, changed)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (site_id, system_name)
            DO UPDATE SET enabled = $3, configuration = $4, changed = $5
            "#,
        )
        .bind(site_id)
        .bind(&record.system_name)
        .bind(record.enabled)
        .bind(&record.configuration)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl EnablementStore for PgEnablementStore {
    async fn get_enablement(&self, site_id: Uuid) -> Result<Vec<EnablementRecord>, EnablementError> {
        let rows = sqlx::query_as::<_, SitePluginRow>(
            "SELECT system_name, enabled, configuration FROM site_plugin \
             WHERE site_id = $1 ORDER BY created, system_name",
        )
        .bind(site_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| EnablementRecord {
                system_name: row.system_name,
                enabled: row.enabled,
                configuration: row.configuration,
            })
            .collect())
    }
}
