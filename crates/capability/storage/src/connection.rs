//! Postgres 连接池与 schema 初始化
//!
//! 启动时执行 `sql/init.sql`；脚本全部为 `if not exists`，可重复执行。

use crate::error::StorageError;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

const INIT_SQL: &str = include_str!("../sql/init.sql");

const MAX_CONNECTIONS: u32 = 8;
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

/// 建立连接池并确保 `signify` schema 存在。
pub async fn connect_pool(database_url: &str) -> Result<PgPool, StorageError> {
    let pool = PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

pub async fn init_schema(pool: &PgPool) -> Result<(), StorageError> {
    sqlx::raw_sql(INIT_SQL).execute(pool).await?;
    Ok(())
}
