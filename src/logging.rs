//! # 日志配置模块
//!
//! 提供统一的tracing初始化，授权决策日志默认提升到debug级别

use std::env;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 初始化日志系统
///
/// 日志级别优先级：`RUST_LOG` 环境变量 > `log_level` 参数 > `info`
pub fn init_logging(log_level: Option<&str>) {
    let level = log_level.unwrap_or("info");

    // 默认配置：网关自身的决策日志提升到debug
    let default_filter = format!("{level},auth_gateway=debug");

    let log_filter = env::var("RUST_LOG").unwrap_or(default_filter);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into()))
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// 环境变量设置指南
pub fn print_logging_help() {
    println!("📋 日志配置指南:");
    println!("  RUST_LOG=info                      # 标准日志级别");
    println!("  RUST_LOG=debug                     # 调试级别");
    println!("  RUST_LOG=info,auth_gateway=warn    # 仅输出网关的警告和错误");
    println!("  RUST_LOG=auth_gateway=trace        # 授权决策详细追踪");
}
