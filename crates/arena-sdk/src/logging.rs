//! 日志初始化
//!
//! 输出格式由 `tracing-subscriber` 的 `fmt` 层提供，过滤规则来自 `RUST_LOG`，
//! 未设置时使用调用方给出的默认规则。同时安装 `LogTracer`，把依赖中通过
//! `log` 输出的记录转发到 `tracing`。

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// 默认过滤规则
pub const DEFAULT_FILTER: &str = "info";

/// 使用默认过滤规则初始化日志
///
/// 可以多次调用，只有第一次生效。
pub fn init_logger() {
    init_logger_with(DEFAULT_FILTER);
}

/// 使用指定的默认过滤规则初始化日志（`RUST_LOG` 优先）
///
/// ```rust
/// arena_sdk::init_logger_with("arena_client=debug");
/// // 第二次调用不做任何事
/// arena_sdk::init_logger();
/// ```
pub fn init_logger_with(default_filter: &str) {
    INIT.call_once(|| {
        // 已经有人安装了 log 转发器时忽略
        let _ = tracing_log::LogTracer::init();

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
        // 已经有全局 subscriber 时（例如测试框架安装的）保持原样
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .try_init();
    });
}
