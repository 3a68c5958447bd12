//! # 密钥存储抽象层
//!
//! 网关核心只依赖此能力接口，不构造任何具体的存储客户端；
//! 真实部署由外层注入托管密钥存储的适配器，测试注入测试替身。

use async_trait::async_trait;
use thiserror::Error;

/// 密钥存储返回的载荷
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretPayload {
    /// 密钥的当前值
    pub value: String,
    /// 存储侧版本号（可选）
    pub version: Option<String>,
}

/// 密钥存储侧错误
#[derive(Debug, Clone, Error)]
pub enum SecretStoreError {
    /// 指定名称的密钥不存在（部署缺陷，不重试）
    #[error("secret not found: {0}")]
    NotFound(String),

    /// 存储不可达或内部故障（可重试）
    #[error("secret store unavailable: {0}")]
    Unavailable(String),
}

/// 密钥存储能力接口
///
/// 唯一的调用方是 [`CredentialProvider`](super::CredentialProvider)。
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// 按名称读取密钥
    ///
    /// `decrypt` 对应托管存储的存储侧解密选项（如加密字符串参数）。
    async fn get_secret(
        &self,
        name: &str,
        decrypt: bool,
    ) -> Result<SecretPayload, SecretStoreError>;
}
