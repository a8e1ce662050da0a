/// 几何体加载和处理模块
///
/// 把 SML 二进制网格转换为可直接渲染的索引三角形网格。
///
/// # 模块结构
///
/// - `vertex`: 顶点数据结构定义
/// - `mesh`: 索引网格数据结构
/// - `decoder`: 分段解码与三角形展开
/// - `dedup`: 并行排序去重
/// - `assembler`: 索引缓冲区组装
/// - `loaders`: 各种格式的模型加载器
///
/// # 架构设计
///
/// ```text
/// 字节流 (SML)
///     ↓
/// SegmentDecoder  →  三角形顶点流（含重复）
///     ↓
/// ParallelSortDeduplicator  →  唯一顶点 + 索引映射
///     ↓
/// assemble  →  Mesh（CPU侧数据）
/// ```
///
/// # 使用示例
///
/// ```rust,no_run
/// use sml_render::geometry::loaders::{MeshLoader, SmlLoader};
/// use std::path::Path;
///
/// let mesh = SmlLoader::load_from_file(Path::new("model.sml"))?;
///
/// println!("顶点数: {}", mesh.vertex_count());
/// println!("三角形数: {}", mesh.triangle_count());
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```

pub mod vertex;
pub mod mesh;
pub mod decoder;
pub mod dedup;
pub mod assembler;
pub mod loaders;

// 重新导出常用类型
pub use vertex::Vertex;
pub use mesh::{Bounds, Mesh};
pub use decoder::{SegmentDecoder, TriangleStream};
pub use dedup::{Deduplicated, IndexMap, ParallelSortDeduplicator};
pub use assembler::assemble;
