//! # 凭证管理模块
//!
//! 提供密钥存储抽象、凭证拉取（含超时、重试、解封）和单飞缓存

mod cache;
mod provider;
mod store;
mod types;

pub use cache::{CredentialCache, CredentialCacheStats, RefreshPolicy};
pub use provider::CredentialProvider;
pub use store::{SecretPayload, SecretStore, SecretStoreError};
pub use types::Credential;
