//! # 决策引擎
//!
//! 纯函数式的授权判定：无I/O、无共享状态、确定性。
//! 令牌比较必须是恒定时间的——时序侧信道在这里是正确性缺陷。

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::credential::Credential;

use super::types::Verdict;

/// 决策引擎
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    principal_id: String,
}

impl DecisionEngine {
    /// 创建决策引擎，`principal_id` 为本部署的固定主体标识
    #[must_use]
    pub fn new(principal_id: impl Into<String>) -> Self {
        Self {
            principal_id: principal_id.into(),
        }
    }

    /// 本部署的固定主体标识
    #[must_use]
    pub fn principal_id(&self) -> &str {
        &self.principal_id
    }

    /// 对出示的令牌做授权判定
    ///
    /// 规则：令牌缺失或为空 → 拒绝；与当前凭证不完全相等 → 拒绝；
    /// 否则允许，并携带调用方提供的上下文数据。
    #[must_use]
    pub fn evaluate(
        &self,
        presented_token: Option<&str>,
        credential: &Credential,
        enrichment: &HashMap<String, String>,
    ) -> Verdict {
        let Some(token) = presented_token else {
            return Verdict::deny(&self.principal_id);
        };
        if token.is_empty() {
            return Verdict::deny(&self.principal_id);
        }

        if tokens_match(token, credential.value()) {
            Verdict::allow(&self.principal_id, enrichment.clone())
        } else {
            Verdict::deny(&self.principal_id)
        }
    }
}

/// 恒定时间的令牌相等比较
///
/// 比较双方的SHA-256摘要：摘要定长，比较耗时与令牌长度和
/// 首个不匹配字节的位置均无关。
fn tokens_match(presented: &str, expected: &str) -> bool {
    let presented_digest: [u8; 32] = Sha256::digest(presented.as_bytes()).into();
    let expected_digest: [u8; 32] = Sha256::digest(expected.as_bytes()).into();
    presented_digest.ct_eq(&expected_digest).into()
}

/// 令牌指纹（SHA-256十六进制前12位），用于日志关联而不泄露令牌本身
#[must_use]
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest)[..12].to_string()
}
