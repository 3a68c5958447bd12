//! # 授权网关模块
//!
//! 组装凭证缓存、决策引擎与策略渲染器，对外提供单一的授权入口

mod service;

pub use service::AuthorizationGateway;
