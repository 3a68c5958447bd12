//! # 授权网关服务
//!
//! 失败关闭（fail-closed）：任何内部故障都渲染为拒绝声明，
//! `authorize` 本身永不失败。

use std::sync::Arc;

use crate::auth::{AuthorizationRequest, DecisionEngine, fingerprint};
use crate::config::GatewayConfig;
use crate::credential::{CredentialCache, CredentialCacheStats, CredentialProvider, RefreshPolicy, SecretStore};
use crate::error::{GatewayError, Result};
use crate::policy::{PolicyRenderer, PolicyStatement};

/// 授权网关
///
/// 持有凭证缓存的唯一句柄，可廉价克隆后在任务间共享。
#[derive(Clone)]
pub struct AuthorizationGateway {
    cache: Arc<CredentialCache>,
    engine: DecisionEngine,
    renderer: PolicyRenderer,
    context_keys: Vec<String>,
}

impl std::fmt::Debug for AuthorizationGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationGateway")
            .field("engine", &self.engine)
            .field("renderer", &self.renderer)
            .field("context_keys", &self.context_keys)
            .finish_non_exhaustive()
    }
}

impl AuthorizationGateway {
    /// 根据配置和密钥存储组装授权网关
    pub fn from_config(config: &GatewayConfig, store: Arc<dyn SecretStore>) -> Result<Self> {
        config
            .validate()
            .map_err(|msg| GatewayError::config(format!("网关配置无效: {msg}")))?;

        let provider = CredentialProvider::new(store, &config.secret, &config.provider)?;
        let policy = RefreshPolicy::from_config(&config.cache);

        Ok(Self {
            cache: Arc::new(CredentialCache::new(provider, policy)),
            engine: DecisionEngine::new(&config.principal_id),
            renderer: PolicyRenderer::new(),
            context_keys: config.context_metadata_keys.clone(),
        })
    }

    /// 对单个请求做授权判定并渲染为策略声明
    ///
    /// 永不返回错误：资源标识为空、凭证不可得等内部故障一律
    /// 渲染为通配符拒绝声明。
    pub async fn authorize(&self, request: &AuthorizationRequest) -> PolicyStatement {
        let resource_id = request.resource_id().trim();
        if resource_id.is_empty() {
            let err = GatewayError::invalid_request("资源标识为空");
            tracing::warn!(error_code = err.error_code(), "授权请求缺少资源标识，按拒绝处理");
            return self.deny_statement();
        }

        let credential = match self.cache.get().await {
            Ok(cred) => cred,
            Err(err) => {
                // 失败关闭：凭证不可得时拒绝，而非放行或崩溃
                tracing::warn!(error = %err, "凭证不可得，按拒绝处理");
                return self.deny_statement();
            }
        };

        let enrichment = self.collect_context(request);
        let verdict = self
            .engine
            .evaluate(request.presented_token(), &credential, &enrichment);

        tracing::debug!(
            effect = if verdict.is_allow() { "ALLOW" } else { "DENY" },
            resource_id,
            token_fingerprint = request
                .presented_token()
                .map(fingerprint)
                .unwrap_or_default(),
            "授权判定完成"
        );

        self.renderer.render(verdict, resource_id)
    }

    /// 凭证缓存统计信息
    pub async fn cache_stats(&self) -> CredentialCacheStats {
        self.cache.stats().await
    }

    /// 按配置的键从请求元数据中提取注入下游的上下文
    fn collect_context(
        &self,
        request: &AuthorizationRequest,
    ) -> std::collections::HashMap<String, String> {
        self.context_keys
            .iter()
            .filter_map(|key| {
                request
                    .metadata()
                    .get(key)
                    .map(|value| (key.clone(), value.clone()))
            })
            .collect()
    }

    fn deny_statement(&self) -> PolicyStatement {
        self.renderer
            .render(crate::auth::Verdict::deny(self.engine.principal_id()), "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Effect;
    use crate::policy::WILDCARD_SCOPE;
    use crate::testing::{CountingSecretStore, StaticSecretStore};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn gateway_with_store(store: Arc<dyn SecretStore>) -> AuthorizationGateway {
        AuthorizationGateway::from_config(&GatewayConfig::default(), store).unwrap()
    }

    #[tokio::test]
    async fn test_valid_token_allows_exact_resource() {
        let gateway = gateway_with_store(Arc::new(StaticSecretStore::new("token123")));
        let request = AuthorizationRequest::new(Some("token123".to_string()), "/orders");

        let statement = gateway.authorize(&request).await;
        assert_eq!(statement.effect, Effect::Allow);
        assert_eq!(statement.resource_scope, "/orders");
    }

    #[tokio::test]
    async fn test_missing_token_denies_wildcard() {
        let gateway = gateway_with_store(Arc::new(StaticSecretStore::new("token123")));
        let request = AuthorizationRequest::new(None, "/orders");

        let statement = gateway.authorize(&request).await;
        assert_eq!(statement.effect, Effect::Deny);
        assert_eq!(statement.resource_scope, WILDCARD_SCOPE);
    }

    #[tokio::test]
    async fn test_blank_resource_id_denied() {
        let gateway = gateway_with_store(Arc::new(StaticSecretStore::new("token123")));
        let request = AuthorizationRequest::new(Some("token123".to_string()), "   ");

        let statement = gateway.authorize(&request).await;
        assert_eq!(statement.effect, Effect::Deny);
        assert_eq!(statement.resource_scope, WILDCARD_SCOPE);
    }

    #[tokio::test]
    async fn test_provider_failure_fails_closed() {
        let gateway = gateway_with_store(Arc::new(CountingSecretStore::failing()));
        let request = AuthorizationRequest::new(Some("token123".to_string()), "/orders");

        let statement = gateway.authorize(&request).await;
        assert_eq!(statement.effect, Effect::Deny);
        assert_eq!(statement.resource_scope, WILDCARD_SCOPE);
    }

    #[tokio::test]
    async fn test_context_enrichment_uses_configured_keys() {
        let config = GatewayConfig {
            context_metadata_keys: vec!["source_ip".to_string()],
            ..Default::default()
        };
        let gateway = AuthorizationGateway::from_config(
            &config,
            Arc::new(StaticSecretStore::new("token123")),
        )
        .unwrap();

        let mut metadata = HashMap::new();
        metadata.insert("source_ip".to_string(), "10.0.0.1".to_string());
        metadata.insert("user_agent".to_string(), "curl".to_string());

        let request = AuthorizationRequest::new(Some("token123".to_string()), "/orders")
            .with_metadata(metadata);

        let statement = gateway.authorize(&request).await;
        assert!(statement.is_allow());
        assert_eq!(statement.context.get("source_ip").unwrap(), "10.0.0.1");
        assert!(!statement.context.contains_key("user_agent"));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_at_assembly() {
        let config = GatewayConfig {
            principal_id: String::new(),
            ..Default::default()
        };
        let err = AuthorizationGateway::from_config(
            &config,
            Arc::new(StaticSecretStore::new("token123")),
        )
        .unwrap_err();

        assert!(matches!(err, GatewayError::Config { .. }));
    }
}
