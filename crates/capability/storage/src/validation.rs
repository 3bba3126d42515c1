//! 验证辅助函数

use crate::error::StorageError;
use domain::TenantContext;

/// 验证租户 ID 有效
pub fn ensure_tenant(ctx: &TenantContext) -> Result<(), StorageError> {
    if ctx.config_id <= 0 {
        return Err(StorageError::new("config_id required"));
    }
    Ok(())
}
