//! Postgres 租户配置存储实现
//!
//! `asset_filter` 以 jsonb 存储，读取时转为文本再由 serde_json 解析。

use crate::error::StorageError;
use crate::traits::ConfigurationStore;
use domain::{Configuration, FilterRule};
use sqlx::{PgPool, Row};

pub struct PgConfigurationStore {
    pub pool: PgPool,
}

impl PgConfigurationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl ConfigurationStore for PgConfigurationStore {
    async fn list_configurations(&self) -> Result<Vec<Configuration>, StorageError> {
        let rows = sqlx::query(
            "select id, base_url, service, service_id, service_secret, app_key, app_secret, \
             enable, refresh_interval, request_timeout, asset_filter::text as asset_filter, \
             active, project_ids \
             from signify.configuration order by id",
        )
        .fetch_all(&self.pool)
        .await?;
        let mut configs = Vec::with_capacity(rows.len());
        for row in rows {
            let asset_filter: Option<String> = row.try_get("asset_filter")?;
            let asset_filter: Vec<Vec<FilterRule>> = match asset_filter {
                Some(text) if !text.is_empty() => serde_json::from_str(&text)?,
                _ => Vec::new(),
            };
            let refresh_interval: i32 = row.try_get("refresh_interval")?;
            let request_timeout: i32 = row.try_get("request_timeout")?;
            let project_ids: Option<Vec<String>> = row.try_get("project_ids")?;
            configs.push(Configuration {
                id: row.try_get("id")?,
                base_url: row.try_get("base_url")?,
                service: row.try_get("service")?,
                service_id: row.try_get("service_id")?,
                service_secret: row.try_get("service_secret")?,
                app_key: row.try_get("app_key")?,
                app_secret: row.try_get("app_secret")?,
                enable: row.try_get("enable")?,
                refresh_interval: u64::try_from(refresh_interval).unwrap_or_default(),
                request_timeout: u64::try_from(request_timeout).ok(),
                asset_filter,
                active: row.try_get("active")?,
                project_ids,
            });
        }
        Ok(configs)
    }

    async fn set_active(&self, config_id: i64, active: bool) -> Result<bool, StorageError> {
        let result = sqlx::query("update signify.configuration set active = $1 where id = $2")
            .bind(active)
            .bind(config_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_all_inactive(&self) -> Result<u64, StorageError> {
        let result = sqlx::query("update signify.configuration set active = false")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
