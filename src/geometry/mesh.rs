//! 网格数据结构模块
//!
//! 定义CPU侧的索引三角形网格：扁平化的唯一顶点坐标（双精度）和三角形索引。
//! 这是加载流水线的最终产物，交付给调用方后由调用方持有。

use nalgebra::Point3;

use crate::core::error::{Result, SmlError};

/// 轴对齐包围盒
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// 最小角点
    pub min: Point3<f64>,
    /// 最大角点
    pub max: Point3<f64>,
}

impl Bounds {
    /// 包围盒中心
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// 包围盒对角线长度，用于相机取景
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).norm()
    }
}

/// CPU侧索引网格
///
/// # 不变量
///
/// - `vertices.len()` 是 3 的倍数（每个顶点 x, y, z 三个分量）
/// - `indices.len()` 是 3 的倍数（每个三角形三个索引）
/// - 每个索引都小于 `vertex_count()`
///
/// # 示例
///
/// ```rust
/// use sml_render::geometry::mesh::Mesh;
///
/// let mesh = Mesh::new(
///     vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
///     vec![0, 1, 2],
/// );
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.triangle_count(), 1);
/// assert!(mesh.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// 扁平化顶点坐标，每个顶点 3 个 `f64`，与去重时的精度一致
    pub vertices: Vec<f64>,

    /// 三角形顶点索引，每3个索引定义一个三角形
    pub indices: Vec<u32>,
}

impl Mesh {
    /// 由扁平缓冲区创建网格
    pub fn new(vertices: Vec<f64>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// 获取顶点数量
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// 获取索引数量
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// 获取三角形数量
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 网格是否不含任何三角形
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty() || self.vertices.is_empty()
    }

    /// 第 `i` 个顶点的坐标
    pub fn vertex(&self, i: usize) -> Option<[f64; 3]> {
        self.vertices
            .get(i * 3..i * 3 + 3)
            .map(|v| [v[0], v[1], v[2]])
    }

    /// 第 `i` 个三角形的三个索引
    pub fn triangle(&self, i: usize) -> Option<[u32; 3]> {
        self.indices
            .get(i * 3..i * 3 + 3)
            .map(|t| [t[0], t[1], t[2]])
    }

    /// 遍历所有三角形
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// 计算包围盒，空网格返回 `None`
    pub fn bounds(&self) -> Option<Bounds> {
        let mut points = self
            .vertices
            .chunks_exact(3)
            .map(|v| Point3::new(v[0], v[1], v[2]));

        let first = points.next()?;
        let (min, max) = points.fold((first, first), |(min, max), p| {
            (min.inf(&p), max.sup(&p))
        });

        Some(Bounds { min, max })
    }

    /// 顶点缓冲区的字节视图，可直接上传到GPU
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// 索引缓冲区的字节视图，可直接上传到GPU
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// 验证网格数据的不变量
    ///
    /// 违反不变量说明组装阶段存在缺陷，返回 [`SmlError::Internal`]。
    pub fn validate(&self) -> Result<()> {
        if self.vertices.len() % 3 != 0 {
            return Err(SmlError::Internal(format!(
                "vertex buffer length {} is not a multiple of 3",
                self.vertices.len()
            )));
        }

        if self.indices.len() % 3 != 0 {
            return Err(SmlError::Internal(format!(
                "index buffer length {} is not a multiple of 3",
                self.indices.len()
            )));
        }

        let vertex_count = self.vertex_count();
        if let Some((i, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &index)| index as usize >= vertex_count)
        {
            return Err(SmlError::Internal(format!(
                "index {} at position {} exceeds vertex count {}",
                index, i, vertex_count
            )));
        }

        Ok(())
    }
}
