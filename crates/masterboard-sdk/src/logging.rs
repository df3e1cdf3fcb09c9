//! 日志初始化

use tracing_subscriber::EnvFilter;

/// 安装全局日志订阅器
///
/// - 过滤规则优先取 `RUST_LOG`，未设置或无效时使用 `default_directive`
///   （例如 `"masterboard_cli=info,masterboard_client=info"`）
/// - `log` crate 的记录通过 `tracing-log` 转发
/// - 输出到 stderr（stdout 留给诊断报告）
///
/// 可重复调用；返回本次调用是否安装了订阅器。
pub fn init_logger(default_directive: &str) -> bool {
    let _ = tracing_log::LogTracer::init();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logger_is_idempotent() {
        init_logger("debug");
        assert!(!init_logger("debug"));
        tracing::info!("logger installed");
    }
}
