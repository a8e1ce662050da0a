//! 错误处理模块
//!
//! 定义了加载器中使用的统一错误类型，使用 `thiserror` 提供友好的错误消息。
//!
//! # 错误分类
//!
//! - **IO 错误**：文件无法打开或读取
//! - **格式错误**：魔数不匹配、未知段类型、截断的段、越界的顶点索引
//! - **空结果**：格式正确但解码后没有任何三角形
//! - **内部一致性错误**：索引映射或组装阶段的不变量被破坏，说明是程序缺陷
//!
//! 前三类会作为用户可见的加载结果报告给调用方；最后一类不可恢复。

use std::path::PathBuf;
use thiserror::Error;

/// 统一的 Result 类型
///
/// 所有可能返回错误的函数都应该使用这个类型。
pub type Result<T> = std::result::Result<T, SmlError>;

/// 加载器的错误类型
#[derive(Debug, Error)]
pub enum SmlError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// 文件不存在或无法读取
    #[error("Mesh file not readable: {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// SML 数据格式错误
    #[error("Malformed SML data: {0}")]
    Format(#[from] FormatError),

    /// 解码成功但没有任何三角形
    #[error("Mesh is empty")]
    EmptyMesh,

    /// 不支持的文件格式（按扩展名分发时）
    #[error("Unsupported mesh format: {0}")]
    UnsupportedFormat(String),

    /// 内部一致性错误
    ///
    /// 只会由程序缺陷引起，不应被当作输入错误处理。
    #[error("Internal consistency fault: {0}")]
    Internal(String),

    /// 其他 IO 错误（配置、日志文件等）
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// SML 格式错误
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// 文件头魔数不是 "SML1"
    #[error("bad magic {found:?}, expected \"SML1\"")]
    BadMagic { found: Vec<u8> },

    /// 文件在校验和字段处结束
    #[error("missing checksum field")]
    MissingChecksum,

    /// 校验和不匹配（仅在严格模式下报告）
    #[error("checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// 段头或段数据不完整
    #[error("truncated segment at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedSegment {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// 未知的段类型
    #[error("unrecognized segment type {tag} at offset {offset}")]
    UnknownSegment { tag: u8, offset: usize },

    /// 三角形带的种子三角形不完整
    #[error("triangle strip at offset {offset} is shorter than its seed triangle ({len} bytes)")]
    ShortStrip { offset: usize, len: usize },

    /// 三角形顶点流超出 32 位索引的表示范围
    #[error("triangle stream of {vertices} vertices exceeds the 32-bit index range")]
    StreamTooLarge { vertices: usize },

    /// 拓扑段引用了当前顶点池之外的索引
    #[error("vertex index {index} out of range (pool holds {pool_len} vertices)")]
    IndexOutOfRange { index: u32, pool_len: usize },
}

/// 配置相关的错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置文件未找到
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    /// 配置文件解析失败
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// 配置值无效
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl SmlError {
    /// 是否为格式错误
    pub fn is_format(&self) -> bool {
        matches!(self, SmlError::Format(_) | SmlError::UnsupportedFormat(_))
    }
}
