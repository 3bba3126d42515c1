//! # PostgreSQL 存储实现模块
//!
//! 生产环境使用。依赖 schema `signify` 下的两张表：
//!
//! - `signify.configuration`：租户配置（id, base_url, service, service_id, service_secret,
//!   app_key, app_secret, enable, refresh_interval, request_timeout, asset_filter, active,
//!   project_ids）
//! - `signify.asset`：资产映射（configuration_id, project_id, uuid, parent_uuid,
//!   global_asset_id, kind, asset_id），`unique (configuration_id, project_id, global_asset_id)`
//!
//! 建表语句见 `crates/capability/storage/sql/init.sql`。
//!
//! 所有查询使用参数绑定（`$1`, `$2` 等），资产查询都带 `configuration_id` 条件。

pub mod asset;
pub mod configuration;

pub use asset::*;
pub use configuration::*;
