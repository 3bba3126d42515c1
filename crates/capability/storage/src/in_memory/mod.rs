//! 内存存储实现模块
//!
//! 用于测试、演示以及未配置数据库时运行。
//!
//! - AssetStore: InMemoryAssetStore
//! - ConfigurationStore: InMemoryConfigurationStore

pub mod asset;
pub mod configuration;

pub use asset::*;
pub use configuration::*;
