use std::time::{SystemTime, UNIX_EPOCH};

/// 过期前预留的安全余量（秒）。
pub const TOKEN_SAFETY_MARGIN_SECONDS: i64 = 300;

/// 已换取的访问令牌。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken {
    pub token: String,
    /// 签发时间（Unix 秒）。
    pub issued_at: i64,
    pub expires_in: i64,
}

impl BearerToken {
    /// `now < issued_at + expires_in - 300` 且令牌非空时可用。
    pub fn is_fresh(&self, now: i64) -> bool {
        !self.token.is_empty()
            && now
                < self
                    .issued_at
                    .saturating_add(self.expires_in)
                    .saturating_sub(TOKEN_SAFETY_MARGIN_SECONDS)
    }

    /// 日志用的截断形式。
    pub fn preview(&self) -> &str {
        let end = self
            .token
            .char_indices()
            .nth(10)
            .map(|(idx, _)| idx)
            .unwrap_or(self.token.len());
        &self.token[..end]
    }
}

/// 时间来源。
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> i64;
}

/// 系统时钟。
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_secs() as i64)
            .unwrap_or_default()
    }
}
