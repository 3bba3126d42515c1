//! 存储层错误类型

/// 存储错误。
///
/// `Invalid` 覆盖调用方可见的约束失败（租户缺失、项目作用域不符、重复映射）。
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("{0}")]
    Invalid(String),
}

impl StorageError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Invalid(message.into())
    }
}
