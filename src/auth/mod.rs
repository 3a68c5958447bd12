//! # 授权决策模块
//!
//! 定义授权请求/判定的数据模型，并提供纯函数式的决策引擎

mod decision;
mod types;

pub use decision::{DecisionEngine, fingerprint};
pub use types::{AuthorizationRequest, Effect, Verdict};
