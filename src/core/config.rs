//! 配置管理模块
//!
//! 提供加载器配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，也支持命令行参数覆盖。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [loader]
//! threads = 0                 # 0 表示自动检测硬件并发数
//! checksum = "ignore"         # ignore, warn, strict
//! default_model = "assets/sphere.sml"
//!
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// 无法检测硬件并发数时使用的线程预算
pub const FALLBACK_THREAD_BUDGET: usize = 8;

/// 允许配置的最大线程预算
const MAX_THREAD_BUDGET: usize = 1024;

/// 加载器配置
///
/// 包含了加载器运行所需的所有配置项。
/// 可以从配置文件加载，也可以通过代码构建。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 加载器配置
    #[serde(default)]
    pub loader: LoaderConfig,

    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 加载流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// 排序去重使用的线程预算，0 表示自动检测
    #[serde(default)]
    pub threads: usize,

    /// 校验和处理策略
    #[serde(default)]
    pub checksum: ChecksumPolicy,

    /// 未指定文件时加载的默认模型
    #[serde(default = "default_model")]
    pub default_model: String,
}

/// 校验和处理策略
///
/// SML 文件头保留了 4 字节校验和，默认只读取不校验。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// 读取但不校验
    #[default]
    Ignore,
    /// 校验失败时记录警告并继续
    Warn,
    /// 校验失败视为格式错误
    Strict,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

// 默认值函数
fn default_model() -> String { "assets/sphere.sml".to_string() }
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "sml_render.log".to_string() }

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            checksum: ChecksumPolicy::default(),
            default_model: default_model(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl LoaderConfig {
    /// 实际使用的线程预算
    ///
    /// `threads` 为 0 时使用检测到的硬件并发数，
    /// 检测失败时退回 [`FALLBACK_THREAD_BUDGET`]。
    pub fn thread_budget(&self) -> usize {
        if self.threads > 0 {
            return self.threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(FALLBACK_THREAD_BUDGET)
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 参数
    ///
    /// * `path` - 配置文件路径
    ///
    /// # 返回值
    ///
    /// 成功返回 `Config` 实例，失败返回错误
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        Self::from_toml_str(&contents)
    }

    /// 从 TOML 字符串解析
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        Self::from_file(path).unwrap_or_default()
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 从命令行参数覆盖配置
    ///
    /// # 说明
    ///
    /// 支持的参数：
    /// - `--threads <value>`: 设置线程预算
    /// - `--checksum <ignore|warn|strict>`: 设置校验和策略
    /// - `--verbose`: 日志级别调整为 debug
    ///
    /// 无法解析的值会被忽略，保留原配置。
    pub fn apply_args<I>(&mut self, args: I)
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|s| s.as_ref().to_string()).collect();

        if let Some(idx) = args.iter().position(|a| a == "--threads") {
            if let Some(threads) = args.get(idx + 1).and_then(|s| s.parse().ok()) {
                self.loader.threads = threads;
            }
        }

        if let Some(idx) = args.iter().position(|a| a == "--checksum") {
            let policy = match args.get(idx + 1).map(String::as_str) {
                Some("ignore") => Some(ChecksumPolicy::Ignore),
                Some("warn") => Some(ChecksumPolicy::Warn),
                Some("strict") => Some(ChecksumPolicy::Strict),
                _ => None,
            };
            if let Some(policy) = policy {
                self.loader.checksum = policy;
            }
        }

        if args.iter().any(|a| a == "--verbose") {
            self.logging.level = LogLevel::Debug;
        }
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.loader.threads > MAX_THREAD_BUDGET {
            return Err(ConfigError::InvalidValue {
                field: "loader.threads".to_string(),
                reason: format!("Thread budget must not exceed {}", MAX_THREAD_BUDGET),
            }
            .into());
        }

        if self.logging.file_output && self.logging.log_file.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.log_file".to_string(),
                reason: "Log file path must be set when file output is enabled".to_string(),
            }
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.loader.threads, 0);
        assert_eq!(config.loader.checksum, ChecksumPolicy::Ignore);
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.loader.threads = 4096;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            [loader]
            threads = 2
            checksum = "strict"
            "#,
        )
        .unwrap();

        assert_eq!(config.loader.threads, 2);
        assert_eq!(config.loader.checksum, ChecksumPolicy::Strict);
        assert_eq!(config.loader.default_model, "assets/sphere.sml");
        assert!(!config.logging.file_output);
    }

    #[test]
    fn test_parse_invalid_toml() {
        assert!(Config::from_toml_str("[loader]\nchecksum = \"sometimes\"").is_err());
    }

    #[test]
    fn test_apply_args() {
        let mut config = Config::default();
        config.apply_args(["sml_render", "--threads", "3", "--checksum", "warn", "--verbose"]);

        assert_eq!(config.loader.threads, 3);
        assert_eq!(config.loader.checksum, ChecksumPolicy::Warn);
        assert_eq!(config.logging.level, LogLevel::Debug);

        config.apply_args(["--threads", "many"]);
        assert_eq!(config.loader.threads, 3);
    }

    #[test]
    fn test_thread_budget() {
        let mut loader = LoaderConfig::default();
        assert!(loader.thread_budget() >= 1);

        loader.threads = 5;
        assert_eq!(loader.thread_budget(), 5);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.loader.threads = 6;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.loader.threads, 6);
    }
}
