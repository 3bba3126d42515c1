use signify_auth::AuthError;

/// 层级采集错误。
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("request {endpoint} failed: {message}")]
    Transport { endpoint: String, message: String },
    #[error("request {endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },
    #[error("decode {endpoint} failed: {message}")]
    Decode { endpoint: String, message: String },
    #[error("invalid filter regex `{regex}`: {message}")]
    Filter { regex: String, message: String },
    #[error("subscription {endpoint} unavailable: {errors}")]
    Subscription { endpoint: String, errors: String },
}

impl FetchError {
    /// 远端返回 401 时为 true。
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, FetchError::Status { status: 401, .. })
    }
}
