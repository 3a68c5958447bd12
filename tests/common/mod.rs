//! 集成测试共享的密钥存储替身

// 各个测试二进制只用到其中一部分替身
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use auth_gateway::config::GatewayConfig;
use auth_gateway::credential::{SecretPayload, SecretStore, SecretStoreError};
use auth_gateway::{AuthorizationGateway, GatewayError};
use tokio::sync::Mutex;

/// 始终返回同一密钥值的存储
pub struct FixedSecretStore {
    value: String,
    delay: Duration,
}

impl FixedSecretStore {
    pub fn new(value: &str) -> Self {
        Self {
            value: value.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl SecretStore for FixedSecretStore {
    async fn get_secret(
        &self,
        _name: &str,
        _decrypt: bool,
    ) -> Result<SecretPayload, SecretStoreError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(SecretPayload {
            value: self.value.clone(),
            version: None,
        })
    }
}

/// 记录调用次数、可中途改值或置为失败的存储
pub struct RecordingSecretStore {
    value: Mutex<String>,
    fail: std::sync::atomic::AtomicBool,
    calls: AtomicU64,
    delay: Duration,
}

impl RecordingSecretStore {
    pub fn new(value: &str) -> Self {
        Self {
            value: Mutex::new(value.to_string()),
            fail: std::sync::atomic::AtomicBool::new(false),
            calls: AtomicU64::new(0),
            delay: Duration::ZERO,
        }
    }

    pub fn failing() -> Self {
        let store = Self::new("");
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn set_value(&self, value: &str) {
        *self.value.lock().await = value.to_string();
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl SecretStore for RecordingSecretStore {
    async fn get_secret(
        &self,
        _name: &str,
        _decrypt: bool,
    ) -> Result<SecretPayload, SecretStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(SecretStoreError::Unavailable("存储不可用".to_string()));
        }
        Ok(SecretPayload {
            value: self.value.lock().await.clone(),
            version: None,
        })
    }
}

/// 按脚本逐次返回结果的存储
pub struct SequenceSecretStore {
    script: Mutex<VecDeque<Result<SecretPayload, SecretStoreError>>>,
}

impl SequenceSecretStore {
    pub fn new(script: Vec<Result<SecretPayload, SecretStoreError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }
}

#[async_trait]
impl SecretStore for SequenceSecretStore {
    async fn get_secret(
        &self,
        _name: &str,
        _decrypt: bool,
    ) -> Result<SecretPayload, SecretStoreError> {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Err(SecretStoreError::Unavailable("脚本已耗尽".to_string())))
    }
}

pub fn payload(value: &str) -> Result<SecretPayload, SecretStoreError> {
    Ok(SecretPayload {
        value: value.to_string(),
        version: None,
    })
}

pub fn default_gateway(store: Arc<dyn SecretStore>) -> Result<AuthorizationGateway, GatewayError> {
    AuthorizationGateway::from_config(&GatewayConfig::default(), store)
}
