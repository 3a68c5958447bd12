//! # 测试支持模块
//!
//! 提供密钥存储的测试替身，供本仓库测试和下游消费者（`testing` feature）使用

mod stores;

pub use stores::{CountingSecretStore, FlakySecretStore, ScriptedSecretStore, StaticSecretStore};
