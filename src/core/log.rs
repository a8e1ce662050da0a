//! 日志系统模块
//!
//! 基于 `tracing` 提供结构化的日志记录功能。
//!
//! # 特性
//!
//! - 结构化日志：支持键值对
//! - 灵活输出：支持控制台和文件输出
//! - 日志级别：trace, debug, info, warn, error
//! - `RUST_LOG` 环境变量优先于配置文件中的级别
//!
//! # 使用示例
//!
//! ```no_run
//! use sml_render::core::config::LogLevel;
//! use sml_render::core::log;
//!
//! // 仅控制台输出
//! log::init_logger(LogLevel::Info, false, None);
//!
//! // 结构化日志
//! tracing::info!(triangles = 128, "Mesh loaded");
//! ```

use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use std::path::Path;

use super::config::LogLevel;

/// 初始化日志系统
///
/// 必须在程序开始时调用一次；重复调用会被忽略。
///
/// # 参数
///
/// * `level` - 日志级别
/// * `file_output` - 是否输出到文件
/// * `log_file_path` - 日志文件路径（可选，默认为 "sml_render.log"）
pub fn init_logger(level: LogLevel, file_output: bool, log_file_path: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            EnvFilter::default().add_directive(LevelFilter::from_level(level.into()).into())
        });

    if file_output {
        // 解析日志文件路径
        let log_path = log_file_path.unwrap_or("sml_render.log");
        let path = Path::new(log_path);
        let directory = path.parent().unwrap_or(Path::new("."));
        let filename = path.file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("sml_render.log");

        // 每天滚动
        let file_appender = RollingFileAppender::new(
            Rotation::DAILY,
            directory,
            filename
        );

        let console_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(true);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_ansi(false)  // 文件不需要 ANSI 颜色
            .with_writer(file_appender);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_layer)
            .try_init();
    } else {
        let fmt_layer = fmt::layer()
            .with_target(true)
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .with_ansi(true);

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .try_init();
    }
}

/// 加载器日志 - Info 级别
#[macro_export]
macro_rules! loader_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "sml_render::loader", $($arg)*)
    };
}

/// 加载器日志 - Warn 级别
#[macro_export]
macro_rules! loader_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "sml_render::loader", $($arg)*)
    };
}

/// 加载器日志 - Error 级别
#[macro_export]
macro_rules! loader_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "sml_render::loader", $($arg)*)
    };
}

/// 日志级别转换
impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
    }

    #[test]
    fn test_configured_level_filters_events() {
        let filter = EnvFilter::default()
            .add_directive(LevelFilter::from_level(LogLevel::Warn.into()).into());
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init_logger(LogLevel::Warn, false, None);
        init_logger(LogLevel::Debug, false, None);
    }
}
