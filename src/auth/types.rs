//! # 授权类型定义
//!
//! 定义授权请求和判定结果的数据结构

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 授权效果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// 允许访问
    #[serde(rename = "ALLOW")]
    Allow,
    /// 拒绝访问
    #[serde(rename = "DENY")]
    Deny,
}

/// 入站授权请求
///
/// 构造后不可变：除构造器外不提供任何修改入口。
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    presented_token: Option<String>,
    resource_id: String,
    metadata: HashMap<String, String>,
}

impl AuthorizationRequest {
    /// 创建授权请求
    #[must_use]
    pub fn new(presented_token: Option<String>, resource_id: impl Into<String>) -> Self {
        Self {
            presented_token,
            resource_id: resource_id.into(),
            metadata: HashMap::new(),
        }
    }

    /// 附加请求元数据（来源IP、方法等）
    #[must_use]
    pub fn with_metadata(mut self, metadata: HashMap<String, String>) -> Self {
        self.metadata = metadata;
        self
    }

    /// 调用方出示的令牌（可能缺失）
    #[must_use]
    pub fn presented_token(&self) -> Option<&str> {
        self.presented_token.as_deref()
    }

    /// 目标资源标识
    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// 请求元数据
    #[must_use]
    pub const fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }
}

/// 授权判定结果（渲染为策略声明之前的形式）
///
/// 不变式：`Deny` 永远不携带资源级授权——作用域只在 `Allow` 上有意义，
/// 且 `Deny` 的上下文恒为空。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// 授权效果
    pub effect: Effect,
    /// 主体标识
    pub principal_id: String,
    /// 注入下游调用的上下文
    pub context: HashMap<String, String>,
}

impl Verdict {
    /// 创建允许判定
    #[must_use]
    pub fn allow(principal_id: impl Into<String>, context: HashMap<String, String>) -> Self {
        Self {
            effect: Effect::Allow,
            principal_id: principal_id.into(),
            context,
        }
    }

    /// 创建拒绝判定（上下文恒为空）
    #[must_use]
    pub fn deny(principal_id: impl Into<String>) -> Self {
        Self {
            effect: Effect::Deny,
            principal_id: principal_id.into(),
            context: HashMap::new(),
        }
    }

    /// 是否为允许判定
    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.effect == Effect::Allow
    }
}
