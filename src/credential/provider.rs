//! # 凭证提供方
//!
//! 每次调用对外部密钥存储做一轮拉取（含有限重试），不做任何缓存

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ProviderConfig, SealedValue, SecretConfig, SecretCrypto};
use crate::error::{GatewayError, Result};

use super::store::{SecretStore, SecretStoreError};
use super::types::Credential;

/// 凭证提供方
///
/// 解封模式在构造时确定，不支持按调用切换。
pub struct CredentialProvider {
    store: Arc<dyn SecretStore>,
    secret_name: String,
    decrypt: bool,
    crypto: Option<SecretCrypto>,
    timeout: Duration,
    retry_attempts: u32,
    retry_backoff: Duration,
}

impl CredentialProvider {
    /// 根据配置创建凭证提供方
    pub fn new(
        store: Arc<dyn SecretStore>,
        secret: &SecretConfig,
        provider: &ProviderConfig,
    ) -> Result<Self> {
        let crypto = match &secret.seal_key {
            Some(key) => Some(SecretCrypto::from_hex(key)?),
            None => None,
        };

        Ok(Self {
            store,
            secret_name: secret.name.clone(),
            decrypt: secret.decrypt,
            crypto,
            timeout: provider.timeout(),
            retry_attempts: provider.retry_attempts.max(1),
            retry_backoff: provider.backoff(),
        })
    }

    /// 拉取当前有效凭证
    ///
    /// 单次尝试受超时约束；`Unavailable` 和超时按指数退避重试，
    /// `NotFound` 立即失败。重试耗尽后返回 `ProviderUnavailable`。
    pub async fn fetch(&self) -> Result<Credential> {
        let mut last_error: Option<GatewayError> = None;

        for attempt in 1..=self.retry_attempts {
            if attempt > 1 {
                let backoff = self.retry_backoff * 2u32.saturating_pow(attempt - 2);
                tokio::time::sleep(backoff).await;
            }

            match tokio::time::timeout(
                self.timeout,
                self.store.get_secret(&self.secret_name, self.decrypt),
            )
            .await
            {
                Ok(Ok(payload)) => {
                    let value = self.unseal(payload.value)?;
                    return Ok(Credential::new(value, payload.version));
                }
                Ok(Err(SecretStoreError::NotFound(name))) => {
                    // 密钥名称配置错误，重试无意义
                    return Err(GatewayError::provider_unavailable_with_source(
                        format!("密钥不存在: {name}"),
                        SecretStoreError::NotFound(name),
                    ));
                }
                Ok(Err(err @ SecretStoreError::Unavailable(_))) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry_attempts,
                        error = %err,
                        "密钥存储暂不可用，准备重试"
                    );
                    last_error = Some(GatewayError::provider_unavailable_with_source(
                        "密钥存储暂不可用",
                        err,
                    ));
                }
                Err(_elapsed) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.retry_attempts,
                        timeout_ms = self.timeout.as_millis() as u64,
                        "密钥拉取超时，准备重试"
                    );
                    last_error = Some(GatewayError::provider_unavailable(format!(
                        "密钥拉取超时（{}ms）",
                        self.timeout.as_millis()
                    )));
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| GatewayError::provider_unavailable("密钥拉取失败，重试已耗尽")))
    }

    /// 如配置了解封密钥，则将存储返回的密封信封解封为明文
    fn unseal(&self, raw: String) -> Result<String> {
        match &self.crypto {
            Some(crypto) => {
                let sealed: SealedValue = serde_json::from_str(&raw).map_err(|e| {
                    GatewayError::crypto_with_source("密封信封格式错误", e)
                })?;
                crypto.open(&sealed)
            }
            None => Ok(raw),
        }
    }
}
