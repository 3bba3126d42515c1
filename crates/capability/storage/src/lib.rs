//! # Signify Storage 模块
//!
//! 提供资产映射与租户配置的存储抽象层，支持两种后端：
//!
//! - `in_memory/`：内存存储实现（用于测试、演示和无数据库运行）
//! - `postgres/`：PostgreSQL 存储实现（生产环境使用，schema `signify`）
//!
//! ## 核心约束
//!
//! - **租户隔离**：资产接口显式接收 `TenantContext`，查询全部带 `config_id` 条件
//! - **唯一映射**：`(config_id, project_id, global_asset_id)` 至多一条记录
//! - **只追加**：记录创建后不原地更新，只能随整租户删除
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use signify_storage::{AssetStore, InMemoryAssetStore};
//! use domain::TenantContext;
//!
//! let store = InMemoryAssetStore::new();
//! let ctx = TenantContext::new(1);
//! let id = store.find_asset_id(&ctx, "project-1", "signify_root_root").await?;
//! ```

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod traits;
pub mod validation;

pub use connection::*;
pub use error::*;
pub use models::*;
pub use traits::*;
pub use validation::*;

pub use in_memory::{InMemoryAssetStore, InMemoryConfigurationStore};
pub use postgres::{PgAssetStore, PgConfigurationStore};
