//! 认证能力：Signify Bearer Token 换取与按租户缓存。

mod cache;
mod exchange;
mod token;

pub use cache::TokenCache;
pub use exchange::{HttpTokenExchanger, TokenExchanger};
pub use token::{BearerToken, Clock, SystemClock, TOKEN_SAFETY_MARGIN_SECONDS};

/// 认证相关错误。
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Transport(String),
    #[error("token request returned status {0}")]
    Status(u16),
    #[error("token response decode failed: {0}")]
    Decode(String),
    #[error("token request rejected: {0}")]
    Fault(String),
}
