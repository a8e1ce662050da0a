//! 几何体顶点定义模块
//!
//! 定义解码与去重阶段使用的顶点结构：三个 `f64` 坐标，外加一个
//! 记录排序前位置的来源索引。

use std::cmp::Ordering;

/// 三角形顶点流中的一个顶点
///
/// 无论源数据是单精度还是双精度，坐标统一提升为 `f64`。
///
/// # 相等与排序
///
/// - `origin` 只用于排序后恢复三角形绕序，不参与相等和排序比较
/// - 坐标按 (x, y, z) 字典序比较，每个分量使用 IEEE 全序（`f64::total_cmp`）
/// - 构造时把 `-0.0` 规范为 `+0.0`，因此相等即数值相等：没有容差，正负零合并为同一顶点
///
/// # 示例
///
/// ```rust
/// use sml_render::geometry::vertex::Vertex;
///
/// let a = Vertex::new(1.0, 2.0, 3.0).with_origin(0);
/// let b = Vertex::new(1.0, 2.0, 3.0).with_origin(7);
/// assert_eq!(a, b);
/// assert!(Vertex::new(0.0, 5.0, 5.0) < a);
/// ```
#[derive(Default, Clone, Copy, Debug)]
pub struct Vertex {
    /// 顶点位置 (x, y, z)
    pub position: [f64; 3],

    /// 排序前在三角形顶点流中的位置
    pub origin: u32,
}

impl Vertex {
    /// 创建一个新的顶点，来源索引为 0
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self {
            // -0.0 + 0.0 == +0.0
            position: [x + 0.0, y + 0.0, z + 0.0],
            origin: 0,
        }
    }

    /// 从单精度坐标创建顶点
    #[inline]
    pub fn from_f32(coords: [f32; 3]) -> Self {
        Self::new(coords[0] as f64, coords[1] as f64, coords[2] as f64)
    }

    /// 设置来源索引
    #[inline]
    pub fn with_origin(mut self, origin: u32) -> Self {
        self.origin = origin;
        self
    }

}

impl PartialEq for Vertex {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Vertex {}

impl PartialOrd for Vertex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Vertex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position[0]
            .total_cmp(&other.position[0])
            .then_with(|| self.position[1].total_cmp(&other.position[1]))
            .then_with(|| self.position[2].total_cmp(&other.position[2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_creation() {
        let vertex = Vertex::new(1.0, 2.0, 3.0);

        assert_eq!(vertex.position, [1.0, 2.0, 3.0]);
        assert_eq!(vertex.origin, 0);
    }

    #[test]
    fn test_origin_ignored_by_equality() {
        let a = Vertex::new(0.5, 0.5, 0.5).with_origin(1);
        let b = Vertex::new(0.5, 0.5, 0.5).with_origin(2);

        assert_eq!(a, b);
        assert_eq!(a.cmp(&b), Ordering::Equal);
    }

    #[test]
    fn test_lexicographic_order() {
        let a = Vertex::new(0.0, 9.0, 9.0);
        let b = Vertex::new(1.0, 0.0, 0.0);
        let c = Vertex::new(1.0, 0.0, 1.0);

        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_no_tolerance() {
        let a = Vertex::new(0.1 + 0.2, 0.0, 0.0);
        let b = Vertex::new(0.3, 0.0, 0.0);

        assert_ne!(a, b);
    }

    #[test]
    fn test_signed_zero_merged() {
        let negative = Vertex::new(-0.0, 0.0, -0.0);

        assert_eq!(negative, Vertex::new(0.0, 0.0, 0.0));
        assert!(negative.position.iter().all(|c| c.is_sign_positive()));
        assert_eq!(Vertex::from_f32([-0.0, 1.0, 0.0]), Vertex::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_f32_promotion() {
        let vertex = Vertex::from_f32([0.1, 0.2, 0.3]);

        assert_eq!(vertex.position, [0.1f32 as f64, 0.2f32 as f64, 0.3f32 as f64]);
    }
}
