//! 并行排序去重
//!
//! 把三角形顶点流（每个顶点重复出现在所有相邻三角形中）压缩为唯一顶点
//! 序列和索引映射表：
//!
//! 1. 给每个顶点打上来源索引（排序前的位置）
//! 2. 按线程预算做分治并行归并排序
//! 3. 单遍扫描，相邻相等的顶点合并为一个槽位
//!
//! 排序只改变顶点的存放顺序；来源索引让组装阶段能按原始位置恢复绕序。

use rayon::prelude::*;

use crate::core::config::LoaderConfig;
use crate::geometry::decoder::TriangleStream;
use crate::geometry::vertex::Vertex;

/// 索引映射中尚未赋值的槽位
pub const UNMAPPED: u32 = u32::MAX;

/// 从原始流位置到唯一顶点槽位的映射
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexMap {
    slots: Vec<u32>,
}

impl IndexMap {
    /// 由槽位表创建
    pub fn from_slots(slots: Vec<u32>) -> Self {
        Self { slots }
    }

    /// 原始位置 `origin` 对应的槽位
    pub fn get(&self, origin: usize) -> Option<u32> {
        self.slots.get(origin).copied().filter(|&slot| slot != UNMAPPED)
    }

    /// 映射的条目数（等于原始流长度）
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 按原始流顺序访问全部槽位
    pub fn as_slice(&self) -> &[u32] {
        &self.slots
    }
}

/// 去重结果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deduplicated {
    /// 按排序顺序排列的唯一顶点
    pub unique: Vec<Vertex>,
    /// 原始位置到唯一顶点槽位的映射
    pub index_map: IndexMap,
}

impl Deduplicated {
    /// 唯一顶点数量
    pub fn unique_count(&self) -> usize {
        self.unique.len()
    }

    /// 输入流为空时结果也为空
    pub fn is_empty(&self) -> bool {
        self.unique.is_empty()
    }
}

/// 按线程预算并行排序并去重
///
/// # 使用示例
///
/// ```rust
/// use sml_render::geometry::decoder::TriangleStream;
/// use sml_render::geometry::dedup::ParallelSortDeduplicator;
/// use sml_render::geometry::vertex::Vertex;
///
/// let a = Vertex::new(0.0, 0.0, 0.0);
/// let b = Vertex::new(1.0, 0.0, 0.0);
/// let c = Vertex::new(0.0, 1.0, 0.0);
/// let d = Vertex::new(1.0, 1.0, 0.0);
/// let stream = TriangleStream::from_triangles([[a, b, c], [c, b, d]]);
///
/// let result = ParallelSortDeduplicator::new(4).deduplicate(stream);
/// assert_eq!(result.unique_count(), 4);
/// assert_eq!(result.index_map.len(), 6);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ParallelSortDeduplicator {
    threads: usize,
}

impl Default for ParallelSortDeduplicator {
    fn default() -> Self {
        Self::with_detected_threads()
    }
}

impl ParallelSortDeduplicator {
    /// 使用指定的线程预算
    pub fn new(threads: usize) -> Self {
        Self { threads }
    }

    /// 使用检测到的硬件并发数，检测失败时为 8
    pub fn with_detected_threads() -> Self {
        Self::new(LoaderConfig::default().thread_budget())
    }

    /// 线程预算
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// 对三角形顶点流去重
    ///
    /// 流长度必须能用 `u32` 表示（解码器保证这一点）。
    pub fn deduplicate(&self, stream: TriangleStream) -> Deduplicated {
        let mut vertices = stream.into_vertices();
        if vertices.is_empty() {
            return Deduplicated::default();
        }

        tag_origins(&mut vertices);
        parallel_sort(&mut vertices, self.threads);
        compact(&vertices)
    }
}

/// 记录每个顶点排序前的位置
fn tag_origins(vertices: &mut [Vertex]) {
    vertices
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, v)| v.origin = i as u32);
}

/// 按线程预算的分治归并排序
///
/// 预算小于 2 或元素少于 2 个时顺序排序；否则在中点切分，两半各分到
/// 一半预算并发排序，汇合之后再原地归并。两半是互不重叠的子切片，
/// 归并只在两侧都完成后进行。
///
/// 基础排序和归并都是稳定的，所以结果与预算无关。
pub fn parallel_sort(vertices: &mut [Vertex], threads: usize) {
    if threads < 2 || vertices.len() < 2 {
        vertices.sort();
        return;
    }

    let mid = vertices.len() / 2;
    {
        let (left, right) = vertices.split_at_mut(mid);
        let budget = threads / 2;
        rayon::join(
            || parallel_sort(left, budget),
            || parallel_sort(right, budget),
        );
    }
    merge_halves(vertices, mid);
}

/// 原地归并 `[..mid]` 与 `[mid..]` 两个有序区间
fn merge_halves(vertices: &mut [Vertex], mid: usize) {
    if mid == 0 || mid == vertices.len() || vertices[mid - 1] <= vertices[mid] {
        return;
    }

    let left = vertices[..mid].to_vec();
    let (mut i, mut j, mut k) = (0, mid, 0);

    // k == i + (j - mid) <= j，写入位置不会越过未读取的右半部分
    while i < left.len() && j < vertices.len() {
        if left[i] <= vertices[j] {
            vertices[k] = left[i];
            i += 1;
        } else {
            vertices[k] = vertices[j];
            j += 1;
        }
        k += 1;
    }

    while i < left.len() {
        vertices[k] = left[i];
        i += 1;
        k += 1;
    }
}

/// 扫描有序序列，合并相邻相等的顶点
fn compact(sorted: &[Vertex]) -> Deduplicated {
    let mut unique: Vec<Vertex> = Vec::new();
    let mut slots = vec![UNMAPPED; sorted.len()];

    for vertex in sorted {
        if unique.last() != Some(vertex) {
            unique.push(*vertex);
        }
        slots[vertex.origin as usize] = (unique.len() - 1) as u32;
    }

    Deduplicated {
        unique,
        index_map: IndexMap::from_slots(slots),
    }
}
