//! 网格组装
//!
//! 把去重结果转换为最终的 [`Mesh`]：唯一顶点按原精度展平为 `f64` 坐标，
//! 索引缓冲区按原始流顺序读取索引映射，因此三角形绕序与解码时一致。

use crate::core::error::{Result, SmlError};
use crate::geometry::dedup::{Deduplicated, IndexMap};
use crate::geometry::mesh::Mesh;
use crate::geometry::vertex::Vertex;

/// 由唯一顶点和索引映射组装网格
///
/// 映射中的任一条目未赋值或越界都说明去重阶段有缺陷，
/// 返回 [`SmlError::Internal`]。
pub fn assemble(unique: &[Vertex], index_map: &IndexMap) -> Result<Mesh> {
    if index_map.len() % 3 != 0 {
        return Err(SmlError::Internal(format!(
            "index map length {} is not a multiple of 3",
            index_map.len()
        )));
    }

    let vertices: Vec<f64> = unique.iter().flat_map(|v| v.position).collect();

    let indices = (0..index_map.len())
        .map(|origin| match index_map.get(origin) {
            Some(slot) if (slot as usize) < unique.len() => Ok(slot),
            Some(slot) => Err(SmlError::Internal(format!(
                "index map entry {} points at slot {} but only {} unique vertices exist",
                origin,
                slot,
                unique.len()
            ))),
            None => Err(SmlError::Internal(format!(
                "index map entry {} was never assigned",
                origin
            ))),
        })
        .collect::<Result<Vec<u32>>>()?;

    Ok(Mesh::new(vertices, indices))
}

impl Deduplicated {
    /// 组装为网格，见 [`assemble`]
    pub fn into_mesh(self) -> Result<Mesh> {
        assemble(&self.unique, &self.index_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::decoder::TriangleStream;
    use crate::geometry::dedup::{ParallelSortDeduplicator, UNMAPPED};

    #[test]
    fn test_assemble_shared_edge() {
        let unique = vec![
            Vertex::new(0.0, 0.0, 0.0),
            Vertex::new(0.0, 1.0, 0.0),
            Vertex::new(1.0, 0.0, 0.0),
            Vertex::new(1.0, 1.0, 0.0),
        ];
        let map = IndexMap::from_slots(vec![0, 2, 1, 1, 2, 3]);

        let mesh = assemble(&unique, &map).unwrap();

        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 2, 1, 1, 2, 3]);
        assert_eq!(mesh.vertex(1), Some([0.0, 1.0, 0.0]));
    }

    #[test]
    fn test_assemble_preserves_winding() {
        let a = Vertex::new(2.0, 0.0, 0.0);
        let b = Vertex::new(1.0, 0.0, 0.0);
        let c = Vertex::new(0.0, 0.0, 0.0);
        let stream = TriangleStream::from_triangles([[a, b, c]]);

        let mesh = ParallelSortDeduplicator::new(2)
            .deduplicate(stream)
            .into_mesh()
            .unwrap();

        let corners: Vec<[f64; 3]> = mesh
            .triangle(0)
            .unwrap()
            .iter()
            .map(|&i| mesh.vertex(i as usize).unwrap())
            .collect();
        assert_eq!(corners, vec![a.position, b.position, c.position]);
    }

    #[test]
    fn test_assemble_empty() {
        let mesh = assemble(&[], &IndexMap::default()).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn test_unassigned_entry_is_internal_fault() {
        let unique = vec![Vertex::new(0.0, 0.0, 0.0)];
        let map = IndexMap::from_slots(vec![0, UNMAPPED, 0]);

        assert!(matches!(assemble(&unique, &map), Err(SmlError::Internal(_))));
    }

    #[test]
    fn test_out_of_range_slot_is_internal_fault() {
        let unique = vec![Vertex::new(0.0, 0.0, 0.0)];
        let map = IndexMap::from_slots(vec![0, 0, 1]);

        assert!(matches!(assemble(&unique, &map), Err(SmlError::Internal(_))));
    }

    #[test]
    fn test_ragged_map_is_internal_fault() {
        let unique = vec![Vertex::new(0.0, 0.0, 0.0)];
        let map = IndexMap::from_slots(vec![0, 0]);

        assert!(assemble(&unique, &map).is_err());
    }
}
