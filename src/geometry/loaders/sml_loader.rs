/// SML 文件加载器
///
/// 串联解码、去重、组装三个阶段，把 SML 字节流转换为索引网格。
/// 整个流水线是同步的；后台加载见 [`crate::loading`]。
use super::MeshLoader;
use crate::core::config::LoaderConfig;
use crate::core::error::{Result, SmlError};
use crate::geometry::decoder::SegmentDecoder;
use crate::geometry::dedup::ParallelSortDeduplicator;
use crate::geometry::mesh::Mesh;
use crate::{loader_info, loader_warn};
use std::path::Path;
use std::time::{Duration, Instant};

/// 单次加载的统计数据
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadStats {
    /// 输入字节数
    pub bytes: usize,
    /// 解码得到的三角形数量
    pub triangles: usize,
    /// 去重前的顶点数量（3×三角形数）
    pub stream_vertices: usize,
    /// 去重后的唯一顶点数量
    pub unique_vertices: usize,
    /// 去重使用的线程预算
    pub threads: usize,
    /// 解码耗时
    pub decode_time: Duration,
    /// 排序去重耗时
    pub dedup_time: Duration,
    /// 组装耗时
    pub assemble_time: Duration,
}

impl LoadStats {
    /// 三个阶段的总耗时
    pub fn total_time(&self) -> Duration {
        self.decode_time + self.dedup_time + self.assemble_time
    }

    /// 去重压缩比（唯一顶点 / 原始顶点）
    pub fn dedup_ratio(&self) -> f64 {
        if self.stream_vertices == 0 {
            return 0.0;
        }
        self.unique_vertices as f64 / self.stream_vertices as f64
    }
}

/// SML 格式加载器
///
/// # 使用示例
///
/// ```rust,no_run
/// use sml_render::core::config::LoaderConfig;
/// use sml_render::geometry::loaders::SmlLoader;
/// use std::path::Path;
///
/// let loader = SmlLoader::new(&LoaderConfig::default());
/// let (mesh, stats) = loader.load_path(Path::new("assets/sphere.sml"))?;
/// println!("{} 个顶点, 耗时 {:?}", mesh.vertex_count(), stats.total_time());
/// # Ok::<(), sml_render::core::error::SmlError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SmlLoader {
    decoder: SegmentDecoder,
    deduplicator: ParallelSortDeduplicator,
}

impl Default for SmlLoader {
    fn default() -> Self {
        Self::new(&LoaderConfig::default())
    }
}

impl SmlLoader {
    /// 按加载配置创建（线程预算与校验和策略）
    pub fn new(config: &LoaderConfig) -> Self {
        Self {
            decoder: SegmentDecoder::new(config.checksum),
            deduplicator: ParallelSortDeduplicator::new(config.thread_budget()),
        }
    }

    /// 读取并加载文件
    ///
    /// 文件无法打开或读取时返回 [`SmlError::FileUnreadable`]。
    pub fn load_path(&self, path: &Path) -> Result<(Mesh, LoadStats)> {
        let data = std::fs::read(path).map_err(|source| SmlError::FileUnreadable {
            path: path.to_path_buf(),
            source,
        })?;

        loader_info!("开始加载 SML 文件: {} ({} 字节)", path.display(), data.len());
        self.load_bytes(&data)
    }

    /// 从内存中的字节流加载
    ///
    /// 解码成功但没有任何三角形时返回 [`SmlError::EmptyMesh`]。
    pub fn load_bytes(&self, data: &[u8]) -> Result<(Mesh, LoadStats)> {
        let mut stats = LoadStats {
            bytes: data.len(),
            threads: self.deduplicator.threads(),
            ..LoadStats::default()
        };

        let started = Instant::now();
        let stream = self.decoder.decode(data)?;
        stats.decode_time = started.elapsed();
        stats.triangles = stream.triangle_count();
        stats.stream_vertices = stream.len();

        if stream.is_empty() {
            loader_warn!("SML 数据不包含任何三角形");
            return Err(SmlError::EmptyMesh);
        }

        let started = Instant::now();
        let deduplicated = self.deduplicator.deduplicate(stream);
        stats.dedup_time = started.elapsed();
        stats.unique_vertices = deduplicated.unique_count();

        let started = Instant::now();
        let mesh = deduplicated.into_mesh()?;
        mesh.validate()?;
        stats.assemble_time = started.elapsed();

        tracing::debug!(
            decode = ?stats.decode_time,
            dedup = ?stats.dedup_time,
            assemble = ?stats.assemble_time,
            threads = stats.threads,
            "加载阶段耗时"
        );
        loader_info!(
            "成功加载 SML 数据: {} 个三角形, {} 个唯一顶点 (原始 {} 个)",
            stats.triangles,
            stats.unique_vertices,
            stats.stream_vertices
        );

        Ok((mesh, stats))
    }
}

impl MeshLoader for SmlLoader {
    fn load_from_file(path: &Path) -> Result<Mesh> {
        Self::default().load_path(path).map(|(mesh, _)| mesh)
    }

    fn load_from_memory(data: &[u8]) -> Result<Mesh> {
        Self::default().load_bytes(data).map(|(mesh, _)| mesh)
    }

    fn supported_extensions() -> &'static [&'static str] {
        &["sml"]
    }
}
