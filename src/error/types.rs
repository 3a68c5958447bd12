//! # 错误类型定义

use thiserror::Error;

use super::ErrorCategory;

/// 网关主要错误类型
#[derive(Debug, Error)]
pub enum GatewayError {
    /// 配置相关错误
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 凭证提供方不可用（密钥存储不可达或超时，且无缓存可用）
    #[error("凭证提供方不可用: {message}")]
    ProviderUnavailable {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 调用方请求无效（缺少资源标识等）
    #[error("无效请求: {message}")]
    InvalidRequest { message: String },

    /// 密封凭证的加解密错误
    #[error("加密错误: {message}")]
    Crypto {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 序列化/反序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// IO相关错误
    #[error("IO错误: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// 系统内部错误
    #[error("内部错误: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 带上下文的错误包装
    #[error("{context}")]
    Context {
        context: String,
        #[source]
        source: Box<GatewayError>,
    },
}

impl GatewayError {
    /// 将错误归类，供监控与告警使用
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRequest { .. } => ErrorCategory::Client,
            Self::Context { source, .. } => source.category(),
            _ => ErrorCategory::Server,
        }
    }

    /// 错误代码，供结构化日志使用
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "CONFIG_ERROR",
            Self::ProviderUnavailable { .. } => "PROVIDER_UNAVAILABLE",
            Self::InvalidRequest { .. } => "INVALID_REQUEST",
            Self::Crypto { .. } => "CRYPTO_ERROR",
            Self::Serialization { .. } => "SERIALIZATION_ERROR",
            Self::Io { .. } => "IO_ERROR",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::Context { source, .. } => source.error_code(),
        }
    }

    /// 创建配置错误
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的配置错误
    pub fn config_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建凭证提供方不可用错误
    pub fn provider_unavailable<T: Into<String>>(message: T) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的凭证提供方不可用错误
    pub fn provider_unavailable_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建无效请求错误
    pub fn invalid_request<T: Into<String>>(message: T) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// 创建加密错误
    pub fn crypto<T: Into<String>>(message: T) -> Self {
        Self::Crypto {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的加密错误
    pub fn crypto_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Crypto {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建内部错误
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的内部错误
    pub fn internal_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

// 自动转换常见错误类型
impl From<std::io::Error> for GatewayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: "文件操作失败".to_string(),
            source: err,
        }
    }
}

impl From<toml::de::Error> for GatewayError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML解析失败", err)
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON处理失败".to_string(),
            source: err.into(),
        }
    }
}

// 密钥存储错误转换
impl From<crate::credential::SecretStoreError> for GatewayError {
    fn from(err: crate::credential::SecretStoreError) -> Self {
        Self::ProviderUnavailable {
            message: err.to_string(),
            source: Some(anyhow::Error::new(err)),
        }
    }
}
