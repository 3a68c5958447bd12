//! # Token Authorization Gateway Library
//!
//! 令牌授权网关核心库：在受保护资源API前做请求准入决策

pub mod auth;
pub mod config;
pub mod credential;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod policy;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export commonly used types
pub use auth::{AuthorizationRequest, Effect, Verdict};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::AuthorizationGateway;
pub use policy::PolicyStatement;
