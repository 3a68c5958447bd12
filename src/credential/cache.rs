//! # 凭证缓存
//!
//! 单值、单飞（single-flight）的进程内凭证缓存。
//! 状态机：`EMPTY -> POPULATED`（首次成功拉取），之后永不回到 `EMPTY` ——
//! 刷新失败时保留并返回上一个好值（宁可陈旧，不可缺失）。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};

use crate::config::{CacheMode, CredentialCacheConfig};
use crate::error::Result;

use super::provider::CredentialProvider;
use super::types::Credential;

/// 凭证刷新策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// 进程生命周期内只拉取一次
    FetchOnce,
    /// 超过TTL后刷新
    Ttl(Duration),
}

impl RefreshPolicy {
    /// 从缓存配置构造刷新策略
    #[must_use]
    pub const fn from_config(config: &CredentialCacheConfig) -> Self {
        match config.mode {
            CacheMode::FetchOnce => Self::FetchOnce,
            CacheMode::Ttl => Self::Ttl(config.ttl()),
        }
    }

    /// 判断凭证在此策略下是否仍然新鲜
    fn is_fresh(&self, credential: &Credential) -> bool {
        match self {
            Self::FetchOnce => true,
            Self::Ttl(ttl) => credential.age() < *ttl,
        }
    }
}

/// 缓存槽：凭证 + 已完成的拉取代数
struct CacheSlot {
    credential: Option<Credential>,
    attempt: u64,
}

/// 凭证缓存统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialCacheStats {
    /// 缓存是否已填充
    pub populated: bool,
    /// 成功刷新次数
    pub refreshes: u64,
    /// 提供方拉取失败次数
    pub provider_failures: u64,
    /// 以陈旧值兜底的次数
    pub stale_served: u64,
}

/// 单飞凭证缓存
///
/// 冷启动下并发调用只触发一次提供方拉取：后来者在拉取门（tokio互斥锁）
/// 上挂起等待，并以拉取代数判断自己等到的就是那次拉取的结果——
/// 成功则取新值，失败则共享失败（有陈旧值时以陈旧值兜底），绝不重复拉取。
pub struct CredentialCache {
    provider: CredentialProvider,
    policy: RefreshPolicy,
    slot: RwLock<CacheSlot>,
    fetch_gate: Mutex<()>,
    refreshes: AtomicU64,
    provider_failures: AtomicU64,
    stale_served: AtomicU64,
}

impl CredentialCache {
    /// 创建新的凭证缓存
    #[must_use]
    pub fn new(provider: CredentialProvider, policy: RefreshPolicy) -> Self {
        Self {
            provider,
            policy,
            slot: RwLock::new(CacheSlot {
                credential: None,
                attempt: 0,
            }),
            fetch_gate: Mutex::new(()),
            refreshes: AtomicU64::new(0),
            provider_failures: AtomicU64::new(0),
            stale_served: AtomicU64::new(0),
        }
    }

    /// 获取当前凭证
    ///
    /// 命中新鲜值时无任何网络调用；未命中时触发（或等待）一次提供方拉取。
    /// 仅当缓存从未成功填充且本次拉取失败时返回 `ProviderUnavailable`。
    pub async fn get(&self) -> Result<Credential> {
        // 快路径：新鲜值直接返回
        let observed = {
            let slot = self.slot.read().await;
            if let Some(cred) = &slot.credential {
                if self.policy.is_fresh(cred) {
                    return Ok(cred.clone());
                }
            }
            slot.attempt
        };

        // 拉取门串行化所有未命中者；等待期间恰有一次拉取在途
        let _gate = self.fetch_gate.lock().await;

        {
            let slot = self.slot.read().await;
            if let Some(cred) = &slot.credential {
                if self.policy.is_fresh(cred) {
                    // 等待期间同批次的拉取已成功
                    return Ok(cred.clone());
                }
            }
            if slot.attempt != observed {
                // 同批次的拉取已完成但没有产生新鲜值：共享该次结果
                return match &slot.credential {
                    Some(stale) => {
                        self.stale_served.fetch_add(1, Ordering::Relaxed);
                        Ok(stale.clone())
                    }
                    None => Err(crate::error::GatewayError::provider_unavailable(
                        "凭证拉取失败且无缓存可用",
                    )),
                };
            }
        }

        // 轮到本调用执行拉取
        let outcome = self.provider.fetch().await;
        let mut slot = self.slot.write().await;
        slot.attempt += 1;

        match outcome {
            Ok(cred) => {
                self.refreshes.fetch_add(1, Ordering::Relaxed);
                slot.credential = Some(cred.clone());
                Ok(cred)
            }
            Err(err) => {
                self.provider_failures.fetch_add(1, Ordering::Relaxed);
                match &slot.credential {
                    // 刷新失败：保留并返回上一个好值
                    Some(stale) => {
                        self.stale_served.fetch_add(1, Ordering::Relaxed);
                        tracing::warn!(error = %err, "凭证刷新失败，以缓存的陈旧值兜底");
                        Ok(stale.clone())
                    }
                    None => Err(err),
                }
            }
        }
    }

    /// 获取缓存统计信息
    pub async fn stats(&self) -> CredentialCacheStats {
        let populated = self.slot.read().await.credential.is_some();
        CredentialCacheStats {
            populated,
            refreshes: self.refreshes.load(Ordering::Relaxed),
            provider_failures: self.provider_failures.load(Ordering::Relaxed),
            stale_served: self.stale_served.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderConfig, SecretConfig};
    use crate::credential::{SecretPayload, SecretStoreError};
    use crate::testing::{CountingSecretStore, ScriptedSecretStore, StaticSecretStore};
    use pretty_assertions::assert_eq;

    fn make_provider(store: Arc<dyn crate::credential::SecretStore>) -> CredentialProvider {
        let provider_cfg = ProviderConfig {
            timeout_ms: 1000,
            retry_attempts: 1,
            retry_backoff_ms: 1,
        };
        CredentialProvider::new(store, &SecretConfig::default(), &provider_cfg).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_once_hits_provider_exactly_once() {
        let store = Arc::new(CountingSecretStore::new("token123"));
        let cache = CredentialCache::new(make_provider(store.clone()), RefreshPolicy::FetchOnce);

        for _ in 0..5 {
            let cred = cache.get().await.unwrap();
            assert_eq!(cred.value(), "token123");
        }
        assert_eq!(store.calls(), 1);

        let stats = cache.stats().await;
        assert!(stats.populated);
        assert_eq!(stats.refreshes, 1);
    }

    #[tokio::test]
    async fn test_ttl_refresh_picks_up_rotation() {
        let store = Arc::new(CountingSecretStore::new("token-v1"));
        let cache = CredentialCache::new(
            make_provider(store.clone()),
            RefreshPolicy::Ttl(Duration::from_millis(20)),
        );

        assert_eq!(cache.get().await.unwrap().value(), "token-v1");

        // 凭证轮换后，TTL过期的下一次get应当拉到新值
        store.set_value("token-v2");
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(cache.get().await.unwrap().value(), "token-v2");
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn test_stale_value_served_on_refresh_failure() {
        let store = Arc::new(ScriptedSecretStore::new(vec![
            Ok(SecretPayload {
                value: "token123".to_string(),
                version: None,
            }),
            Err(SecretStoreError::Unavailable("维护中".to_string())),
        ]));
        let cache = CredentialCache::new(
            make_provider(store.clone()),
            RefreshPolicy::Ttl(Duration::from_millis(1)),
        );

        assert_eq!(cache.get().await.unwrap().value(), "token123");
        tokio::time::sleep(Duration::from_millis(10)).await;

        // 刷新失败，但缓存保持POPULATED并返回陈旧值
        let cred = cache.get().await.unwrap();
        assert_eq!(cred.value(), "token123");

        let stats = cache.stats().await;
        assert!(stats.populated);
        assert_eq!(stats.provider_failures, 1);
        assert_eq!(stats.stale_served, 1);
    }

    #[tokio::test]
    async fn test_cold_failure_propagates() {
        let store = Arc::new(ScriptedSecretStore::new(vec![]));
        let cache = CredentialCache::new(make_provider(store), RefreshPolicy::FetchOnce);

        let err = cache.get().await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::GatewayError::ProviderUnavailable { .. }
        ));
        assert!(!cache.stats().await.populated);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cold_start_single_flight() {
        let store = Arc::new(
            CountingSecretStore::new("token123").with_delay(Duration::from_millis(50)),
        );
        let cache = Arc::new(CredentialCache::new(
            make_provider(store.clone()),
            RefreshPolicy::FetchOnce,
        ));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.get().await }));
        }

        for handle in handles {
            let cred = handle.await.unwrap().unwrap();
            assert_eq!(cred.value(), "token123");
        }

        // 并发冷启动下提供方只被调用一次
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_cold_failure_shared_by_cohort() {
        let store = Arc::new(
            CountingSecretStore::failing().with_delay(Duration::from_millis(50)),
        );
        let cache = Arc::new(CredentialCache::new(
            make_provider(store.clone()),
            RefreshPolicy::FetchOnce,
        ));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.get().await }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_err());
        }

        // 同批次共享同一次失败，不重复拉取
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_fetch_once_value_never_expires() {
        let store = Arc::new(StaticSecretStore::new("token123"));
        let cache = CredentialCache::new(make_provider(store), RefreshPolicy::FetchOnce);

        let first = cache.get().await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let second = cache.get().await.unwrap();

        assert_eq!(first.value(), second.value());
        assert_eq!(cache.stats().await.refreshes, 1);
    }
}
