//! # 策略声明类型定义

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::auth::Effect;

/// 渲染后的策略声明
///
/// 出站线格式：`{ effect, principalId, resourceScope, context }`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyStatement {
    /// 授权效果
    pub effect: Effect,
    /// 主体标识
    pub principal_id: String,
    /// 资源作用域：允许时为精确资源，拒绝时为通配符
    pub resource_scope: String,
    /// 注入下游调用的上下文
    pub context: HashMap<String, String>,
}

impl PolicyStatement {
    /// 是否为允许声明
    #[must_use]
    pub fn is_allow(&self) -> bool {
        self.effect == Effect::Allow
    }
}
