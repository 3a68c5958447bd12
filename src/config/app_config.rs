//! # 网关配置结构定义

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 网关主配置结构
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// 固定主体标识（ALLOW判定时注入的principalId）
    pub principal_id: String,
    /// 允许从请求元数据复制到ALLOW上下文中的键
    pub context_metadata_keys: Vec<String>,
    /// 密钥配置
    pub secret: SecretConfig,
    /// 凭证缓存配置
    pub cache: CredentialCacheConfig,
    /// 凭证提供方配置
    pub provider: ProviderConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            principal_id: "user".to_string(),
            context_metadata_keys: Vec::new(),
            secret: SecretConfig::default(),
            cache: CredentialCacheConfig::default(),
            provider: ProviderConfig::default(),
        }
    }
}

/// 密钥配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecretConfig {
    /// 密钥在外部存储中的名称
    pub name: String,
    /// 是否要求存储侧解密（对应托管存储的 decrypt 选项）
    pub decrypt: bool,
    /// 本地解封密钥（64位十六进制，存储返回密封信封时必须提供）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seal_key: Option<String>,
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            name: "auth-token".to_string(),
            decrypt: false,
            seal_key: None,
        }
    }
}

/// 凭证缓存刷新模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    /// 进程生命周期内只拉取一次
    FetchOnce,
    /// 超过TTL后刷新
    Ttl,
}

impl Default for CacheMode {
    fn default() -> Self {
        Self::FetchOnce
    }
}

/// 凭证缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialCacheConfig {
    /// 刷新模式
    pub mode: CacheMode,
    /// TTL模式下的过期时间（秒）
    pub ttl_seconds: u64,
}

impl Default for CredentialCacheConfig {
    fn default() -> Self {
        Self {
            mode: CacheMode::FetchOnce,
            ttl_seconds: 300,
        }
    }
}

impl CredentialCacheConfig {
    /// 获取TTL
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

/// 凭证提供方配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// 单次拉取超时（毫秒）
    pub timeout_ms: u64,
    /// 重试次数上限（含首次尝试）
    pub retry_attempts: u32,
    /// 重试退避基准（毫秒，指数递增）
    pub retry_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 2000,
            retry_attempts: 3,
            retry_backoff_ms: 100,
        }
    }
}

impl ProviderConfig {
    /// 获取单次拉取超时
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// 获取退避基准
    pub const fn backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

impl GatewayConfig {
    /// 从TOML字符串解析配置
    pub fn from_toml_str(content: &str) -> crate::error::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config
            .validate()
            .map_err(crate::error::GatewayError::config)?;
        Ok(config)
    }

    /// 从TOML文件加载配置
    pub fn from_toml_file(path: &str) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            crate::error::GatewayError::config_with_source(format!("读取配置文件失败: {path}"), e)
        })?;
        Self::from_toml_str(&content)
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<(), String> {
        if self.principal_id.trim().is_empty() {
            return Err("principal_id cannot be empty".to_string());
        }

        if self.secret.name.trim().is_empty() {
            return Err("secret.name cannot be empty".to_string());
        }

        if let Some(key) = &self.secret.seal_key {
            if key.len() != 64 {
                return Err(
                    "secret.seal_key must be a 64-character hex string (32 bytes)".to_string(),
                );
            }
        }

        if self.cache.mode == CacheMode::Ttl && self.cache.ttl_seconds == 0 {
            return Err("cache.ttl_seconds must be greater than 0 in ttl mode".to_string());
        }

        if self.provider.timeout_ms == 0 {
            return Err("provider.timeout_ms must be greater than 0".to_string());
        }

        if self.provider.retry_attempts == 0 {
            return Err("provider.retry_attempts must be at least 1".to_string());
        }

        Ok(())
    }
}
