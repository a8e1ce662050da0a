//! 核心功能模块
//!
//! 本模块提供了加载器的基础功能，包括日志系统、配置管理和错误处理。
//! 这些模块独立于具体的网格格式，可以在任何加载流程中使用。
//!
//! # 模块组织
//!
//! - `log`：日志系统，提供结构化的日志记录功能
//! - `config`：配置管理，支持从配置文件加载加载器设置
//! - `error`：错误处理，定义统一的错误类型

pub mod log;
pub mod config;
pub mod error;

// 重新导出常用类型，方便使用
pub use error::{Result, SmlError, FormatError, ConfigError};
pub use config::{Config, ChecksumPolicy, LoaderConfig};
