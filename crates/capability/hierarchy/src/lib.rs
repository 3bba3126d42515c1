//! 层级采集能力：站点 → 楼宇 → 楼层 → 传感空间。
//!
//! - `api`：远端接口抽象与 reqwest 实现
//! - `filter`：结构化过滤（组间 OR，组内 AND）
//! - `fetcher`：逐级采集与整树遍历

pub mod api;
pub mod error;
pub mod fetcher;
pub mod filter;

pub use api::{HttpSignifyApi, SignifyApi, endpoints};
pub use error::FetchError;
pub use fetcher::HierarchyFetcher;
pub use filter::CompiledFilter;
