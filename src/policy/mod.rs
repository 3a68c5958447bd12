//! # 策略渲染模块
//!
//! 将授权判定渲染为前置网关层可执行的策略声明

mod renderer;
mod types;

pub use renderer::{PolicyRenderer, WILDCARD_SCOPE};
pub use types::PolicyStatement;
