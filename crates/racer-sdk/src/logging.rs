//! 日志初始化
//!
//! 安装全局 `tracing` 订阅器（`fmt` 输出 + `EnvFilter`），并通过 `tracing-log`
//! 把依赖库经 `log` 发出的记录转交给 `tracing`。

use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("A global tracing subscriber is already installed")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Failed to bridge log records: {0}")]
    LogBridge(#[from] tracing_log::log_tracer::SetLoggerError),
}

/// 初始化全局日志
///
/// `RUST_LOG` 存在时优先使用，否则使用 `default_filter`。
///
/// # 参数
/// - `default_filter`: 例如 `"racer=info"` 或 `"racer_client=debug,racer_stream=trace"`
///
/// # 错误
/// - `LoggerError::Filter`: 过滤表达式非法
/// - `LoggerError::AlreadyInstalled`: 进程中已经安装过订阅器
/// - `LoggerError::LogBridge`: `log` 记录器已被其他库占用
///
/// # 示例
/// ```rust
/// racer_sdk::init_logger("racer_client=info").ok();
/// tracing::info!("logger ready");
/// ```
pub fn init_logger(default_filter: &str) -> Result<(), LoggerError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)?,
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true));
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_filter_is_rejected() {
        // 仅在 RUST_LOG 未设置时才会解析默认过滤器
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let err = init_logger("racer_client=not_a_level").unwrap_err();
        assert!(matches!(err, LoggerError::Filter(_)));
    }

    #[test]
    fn test_second_install_fails() {
        let first = init_logger("warn");
        let second = init_logger("warn");
        // 同一进程中其他测试可能已经安装过
        assert!(first.is_ok() || matches!(first, Err(LoggerError::AlreadyInstalled(_))));
        assert!(matches!(second, Err(LoggerError::AlreadyInstalled(_))));
    }
}
