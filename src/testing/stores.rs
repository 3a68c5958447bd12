//! # 密钥存储测试替身

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::credential::{SecretPayload, SecretStore, SecretStoreError};

/// 始终返回固定值的存储
pub struct StaticSecretStore {
    payload: SecretPayload,
    delay: Option<Duration>,
}

impl StaticSecretStore {
    /// 创建固定值存储
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            payload: SecretPayload {
                value: value.to_string(),
                version: None,
            },
            delay: None,
        }
    }

    /// 附加存储侧版本号
    #[must_use]
    pub fn with_version(mut self, version: &str) -> Self {
        self.payload.version = Some(version.to_string());
        self
    }

    /// 每次读取前增加人为延迟（用于超时和竞态窗口测试）
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl SecretStore for StaticSecretStore {
    async fn get_secret(
        &self,
        _name: &str,
        _decrypt: bool,
    ) -> Result<SecretPayload, SecretStoreError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.payload.clone())
    }
}

/// 统计调用次数的存储，支持运行中改值（模拟凭证轮换）和恒定失败
pub struct CountingSecretStore {
    value: Mutex<String>,
    calls: AtomicU64,
    delay: Option<Duration>,
    fail: bool,
}

impl CountingSecretStore {
    /// 创建计数存储
    #[must_use]
    pub fn new(value: &str) -> Self {
        Self {
            value: Mutex::new(value.to_string()),
            calls: AtomicU64::new(0),
            delay: None,
            fail: false,
        }
    }

    /// 创建每次调用都失败的计数存储
    #[must_use]
    pub fn failing() -> Self {
        Self {
            value: Mutex::new(String::new()),
            calls: AtomicU64::new(0),
            delay: None,
            fail: true,
        }
    }

    /// 每次读取前增加人为延迟
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 已发生的读取次数
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// 替换存储中的值（模拟外部轮换）
    pub fn set_value(&self, value: &str) {
        *self.value.lock().unwrap() = value.to_string();
    }
}

#[async_trait]
impl SecretStore for CountingSecretStore {
    async fn get_secret(
        &self,
        _name: &str,
        _decrypt: bool,
    ) -> Result<SecretPayload, SecretStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail {
            return Err(SecretStoreError::Unavailable("injected failure".to_string()));
        }
        Ok(SecretPayload {
            value: self.value.lock().unwrap().clone(),
            version: None,
        })
    }
}

/// 先失败N次、之后成功的存储
pub struct FlakySecretStore {
    failures_remaining: AtomicU64,
    value: String,
    calls: AtomicU64,
}

impl FlakySecretStore {
    /// 创建先失败 `failures` 次、之后返回 `value` 的存储
    #[must_use]
    pub fn new(failures: u64, value: &str) -> Self {
        Self {
            failures_remaining: AtomicU64::new(failures),
            value: value.to_string(),
            calls: AtomicU64::new(0),
        }
    }

    /// 创建永远失败的存储
    #[must_use]
    pub fn always_failing() -> Self {
        Self::new(u64::MAX, "")
    }

    /// 已发生的读取次数
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for FlakySecretStore {
    async fn get_secret(
        &self,
        _name: &str,
        _decrypt: bool,
    ) -> Result<SecretPayload, SecretStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining.store(remaining - 1, Ordering::SeqCst);
            return Err(SecretStoreError::Unavailable(
                "transient failure".to_string(),
            ));
        }

        Ok(SecretPayload {
            value: self.value.clone(),
            version: None,
        })
    }
}

/// 按脚本顺序返回结果的存储；脚本耗尽后返回 `Unavailable`
pub struct ScriptedSecretStore {
    script: Mutex<VecDeque<Result<SecretPayload, SecretStoreError>>>,
    calls: AtomicU64,
}

impl ScriptedSecretStore {
    /// 创建脚本化存储
    #[must_use]
    pub fn new(script: Vec<Result<SecretPayload, SecretStoreError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicU64::new(0),
        }
    }

    /// 已发生的读取次数
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretStore for ScriptedSecretStore {
    async fn get_secret(
        &self,
        _name: &str,
        _decrypt: bool,
    ) -> Result<SecretPayload, SecretStoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SecretStoreError::Unavailable("script exhausted".to_string())))
    }
}
