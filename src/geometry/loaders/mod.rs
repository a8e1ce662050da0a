/// 模型加载器模块
///
/// 提供统一的模型加载接口和具体格式的实现。
///
/// # 支持的格式
///
/// - **SML**: 分段二进制网格格式（魔数 "SML1"）
///
/// # 使用示例
///
/// ```rust,no_run
/// use sml_render::geometry::loaders::{MeshLoader, SmlLoader};
/// use std::path::Path;
///
/// let mesh = SmlLoader::load_from_file(Path::new("model.sml"))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
use crate::core::error::{Result, SmlError};
use crate::geometry::mesh::Mesh;
use std::path::Path;

pub mod sml_loader;

// 重新导出加载器
pub use sml_loader::{LoadStats, SmlLoader};

/// 网格加载器 trait
///
/// 定义统一的加载接口，所有格式的加载器都实现此 trait。
///
/// # 实现要求
///
/// - 静态方法使用默认配置；需要定制时使用加载器自己的构造函数
/// - 返回 CPU 侧的 `Mesh`，不涉及 GPU 资源
/// - 没有三角形的结果返回 [`SmlError::EmptyMesh`]，不返回空网格
pub trait MeshLoader {
    /// 从文件路径加载网格
    ///
    /// # 错误
    ///
    /// - 文件不存在或无法读取
    /// - 文件格式错误或损坏
    /// - 解码结果为空
    fn load_from_file(path: &Path) -> Result<Mesh>;

    /// 从内存数据加载网格
    fn load_from_memory(data: &[u8]) -> Result<Mesh>;

    /// 获取支持的文件扩展名列表（小写，不含点号）
    fn supported_extensions() -> &'static [&'static str];
}

/// 根据文件扩展名选择合适的加载器
///
/// # 示例
///
/// ```rust,no_run
/// use sml_render::geometry::loaders::load_mesh;
/// use std::path::Path;
///
/// let mesh = load_mesh(Path::new("model.sml"))?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn load_mesh(path: &Path) -> Result<Mesh> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| SmlError::UnsupportedFormat("无法确定文件扩展名".to_string()))?;

    if SmlLoader::supported_extensions().contains(&extension.as_str()) {
        return SmlLoader::load_from_file(path);
    }

    Err(SmlError::UnsupportedFormat(format!(
        "不支持的文件格式: .{}",
        extension
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_extension() {
        let result = load_mesh(Path::new("model.obj"));
        assert!(matches!(result, Err(SmlError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_extension() {
        assert!(load_mesh(Path::new("model")).is_err());
    }

    #[test]
    fn test_dispatch_is_case_insensitive() {
        // 扩展名匹配后才会尝试读取文件
        let result = load_mesh(Path::new("nonexistent.SML"));
        assert!(matches!(result, Err(SmlError::FileUnreadable { .. })));
    }
}
