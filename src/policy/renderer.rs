//! # 策略渲染器
//!
//! 允许 → 精确到所请求的资源；拒绝 → 放大到整个受保护面（通配符）。
//! 放大是有意为之：持无效凭证者无法逐资源试探凭证有效性。
//! 不保留任何重试状态——每个请求独立判定，滥用限流属于前置层职责。

use crate::auth::Verdict;

use super::types::PolicyStatement;

/// 拒绝时使用的通配符作用域（本部署下的全部资源）
pub const WILDCARD_SCOPE: &str = "*";

/// 策略渲染器
#[derive(Debug, Clone, Default)]
pub struct PolicyRenderer;

impl PolicyRenderer {
    /// 创建策略渲染器
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// 将判定渲染为策略声明
    #[must_use]
    pub fn render(&self, verdict: Verdict, resource_id: &str) -> PolicyStatement {
        let resource_scope = if verdict.is_allow() {
            resource_id.to_string()
        } else {
            WILDCARD_SCOPE.to_string()
        };

        PolicyStatement {
            effect: verdict.effect,
            principal_id: verdict.principal_id,
            resource_scope,
            context: verdict.context,
        }
    }
}
