//! 数据模型
//!
//! - AssetRecord：外部位置与 Eliona 资产的映射记录

use domain::AssetKind;

/// 资产映射记录。
///
/// 复合键 `(config_id, project_id, global_asset_id)` 唯一；
/// 创建后 `asset_id` 不再变化。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub config_id: i64,
    pub project_id: String,
    /// 外部 UUID（Signify 侧）。
    pub uuid: String,
    pub parent_uuid: Option<String>,
    pub global_asset_id: String,
    pub kind: AssetKind,
    /// Eliona 资产 ID。
    pub asset_id: i32,
}
