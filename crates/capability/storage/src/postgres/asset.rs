//! Postgres 资产映射存储实现

use crate::error::StorageError;
use crate::models::AssetRecord;
use crate::traits::AssetStore;
use crate::validation::ensure_tenant;
use domain::{AssetKind, TenantContext};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

pub struct PgAssetStore {
    pub pool: PgPool,
}

impl PgAssetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = crate::connection::connect_pool(database_url).await?;
        Ok(Self { pool })
    }
}

fn record_from_row(row: &PgRow) -> Result<AssetRecord, StorageError> {
    let kind: String = row.try_get("kind")?;
    let kind = AssetKind::parse(&kind)
        .ok_or_else(|| StorageError::new(format!("unknown asset kind: {}", kind)))?;
    Ok(AssetRecord {
        config_id: row.try_get("configuration_id")?,
        project_id: row.try_get("project_id")?,
        uuid: row.try_get("uuid")?,
        parent_uuid: row.try_get("parent_uuid")?,
        global_asset_id: row.try_get("global_asset_id")?,
        kind,
        asset_id: row.try_get("asset_id")?,
    })
}

#[async_trait::async_trait]
impl AssetStore for PgAssetStore {
    async fn find_asset_id(
        &self,
        ctx: &TenantContext,
        project_id: &str,
        global_asset_id: &str,
    ) -> Result<Option<i32>, StorageError> {
        ensure_tenant(ctx)?;
        let row = sqlx::query(
            "select asset_id from signify.asset \
             where configuration_id = $1 and project_id = $2 and global_asset_id = $3",
        )
        .bind(ctx.config_id)
        .bind(project_id)
        .bind(global_asset_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(row.try_get("asset_id")?))
    }

    async fn insert_asset(
        &self,
        ctx: &TenantContext,
        record: AssetRecord,
    ) -> Result<AssetRecord, StorageError> {
        ensure_tenant(ctx)?;
        if record.config_id != ctx.config_id {
            return Err(StorageError::new("tenant mismatch"));
        }
        sqlx::query(
            "insert into signify.asset \
             (configuration_id, project_id, uuid, parent_uuid, global_asset_id, kind, asset_id) \
             values ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.config_id)
        .bind(&record.project_id)
        .bind(&record.uuid)
        .bind(&record.parent_uuid)
        .bind(&record.global_asset_id)
        .bind(record.kind.as_str())
        .bind(record.asset_id)
        .execute(&self.pool)
        .await?;
        Ok(record)
    }

    async fn list_assets_by_kind(
        &self,
        ctx: &TenantContext,
        kind: AssetKind,
    ) -> Result<Vec<AssetRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let rows = sqlx::query(
            "select configuration_id, project_id, uuid, parent_uuid, global_asset_id, kind, asset_id \
             from signify.asset where configuration_id = $1 and kind = $2 order by id",
        )
        .bind(ctx.config_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn list_assets_by_uuid(
        &self,
        ctx: &TenantContext,
        uuid: &str,
    ) -> Result<Vec<AssetRecord>, StorageError> {
        ensure_tenant(ctx)?;
        let rows = sqlx::query(
            "select configuration_id, project_id, uuid, parent_uuid, global_asset_id, kind, asset_id \
             from signify.asset where configuration_id = $1 and uuid = $2 order by id",
        )
        .bind(ctx.config_id)
        .bind(uuid)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(record_from_row).collect()
    }

    async fn delete_configuration_assets(
        &self,
        ctx: &TenantContext,
    ) -> Result<u64, StorageError> {
        ensure_tenant(ctx)?;
        let result = sqlx::query("delete from signify.asset where configuration_id = $1")
            .bind(ctx.config_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
