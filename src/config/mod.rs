//! # 配置管理模块
//!
//! 处理网关配置加载、验证和密封凭证的加解密

mod app_config;
mod crypto;

pub use app_config::{CacheMode, CredentialCacheConfig, GatewayConfig, ProviderConfig, SecretConfig};
pub use crypto::{SealedValue, SecretCrypto};

use std::env;
use std::path::Path;

/// 按环境加载配置文件
///
/// 读取 `GATEWAY_ENV` 环境变量（默认 `dev`），加载 `config/gateway.{env}.toml`
pub fn load_config() -> crate::error::Result<GatewayConfig> {
    let env = env::var("GATEWAY_ENV").unwrap_or_else(|_| "dev".to_string());
    let config_file = format!("config/gateway.{env}.toml");

    if !Path::new(&config_file).exists() {
        return Err(crate::error::GatewayError::config(format!(
            "配置文件不存在: {config_file}"
        )));
    }

    GatewayConfig::from_toml_file(&config_file)
}
