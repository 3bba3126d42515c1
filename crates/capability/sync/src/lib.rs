//! 资产同步能力。
//!
//! - `registry`：外部标识 → 平台资产 ID 的幂等映射
//! - `engine`：整树遍历，按缺失情况创建资产

pub mod engine;
pub mod registry;

pub use engine::{SyncEngine, SyncError};
pub use registry::{AssetDraft, AssetRegistry, RegistryError};
