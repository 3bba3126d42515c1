//! 按租户缓存令牌，过期（含安全余量）才重新换取。

use crate::AuthError;
use crate::exchange::TokenExchanger;
use crate::token::{BearerToken, Clock, SystemClock};
use domain::Configuration;
use signify_telemetry::record_token_refresh;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// 令牌缓存。键为配置 ID，只在需要时惰性刷新。
pub struct TokenCache {
    exchanger: Arc<dyn TokenExchanger>,
    clock: Arc<dyn Clock>,
    tokens: RwLock<HashMap<i64, BearerToken>>,
}

impl TokenCache {
    pub fn new(exchanger: Arc<dyn TokenExchanger>) -> Self {
        Self::with_clock(exchanger, Arc::new(SystemClock))
    }

    pub fn with_clock(exchanger: Arc<dyn TokenExchanger>, clock: Arc<dyn Clock>) -> Self {
        Self {
            exchanger,
            clock,
            tokens: RwLock::new(HashMap::new()),
        }
    }

    /// 返回可用令牌；缓存缺失或将过期时换取新令牌。
    ///
    /// 换取失败不写缓存。
    pub async fn get_token(&self, config: &Configuration) -> Result<BearerToken, AuthError> {
        let now = self.clock.now_epoch_seconds();
        if let Some(token) = self.cached(config.id) {
            if token.is_fresh(now) {
                debug!(
                    target: "signify.auth",
                    config_id = config.id,
                    token = token.preview(),
                    "token_reused"
                );
                return Ok(token);
            }
        }

        let (token, expires_in) = self.exchanger.exchange(config).await?;
        let token = BearerToken {
            token,
            issued_at: self.clock.now_epoch_seconds(),
            expires_in,
        };
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.insert(config.id, token.clone());
        }
        record_token_refresh();
        info!(
            target: "signify.auth",
            config_id = config.id,
            token = token.preview(),
            expires_in,
            "token_created"
        );
        Ok(token)
    }

    /// 清除租户令牌，下一次调用重新认证。
    pub fn reset_token(&self, config: &Configuration) {
        if let Ok(mut tokens) = self.tokens.write() {
            tokens.remove(&config.id);
        }
        info!(target: "signify.auth", config_id = config.id, "token_reset");
    }

    fn cached(&self, config_id: i64) -> Option<BearerToken> {
        self.tokens
            .read()
            .ok()
            .and_then(|tokens| tokens.get(&config_id).cloned())
    }
}
