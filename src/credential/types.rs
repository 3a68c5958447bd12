//! # 凭证类型定义

use std::fmt;
use std::time::{Duration, Instant};

/// 当前有效的共享凭证
///
/// 由凭证缓存独占持有，决策引擎每次调用只读借用，不落盘、不序列化。
/// `Debug` 输出对凭证值做脱敏处理。
#[derive(Clone)]
pub struct Credential {
    value: String,
    fetched_at: Instant,
    version: Option<String>,
}

impl Credential {
    /// 创建新凭证，拉取时间取当前时刻
    #[must_use]
    pub fn new(value: String, version: Option<String>) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            version,
        }
    }

    /// 凭证值（只读）
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// 凭证自拉取以来经过的时间
    #[must_use]
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    /// 存储侧版本号（如果存储提供）
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("value", &"<redacted>")
            .field("age", &self.age())
            .field("version", &self.version)
            .finish()
    }
}
