//! SML 分段解码器
//!
//! 将 SML 字节流解析为带类型、带长度的段序列，并把顶点段和拓扑段
//! 展开为未去重的三角形顶点流。
//!
//! # 文件布局（全部小端）
//!
//! ```text
//! offset 0   4 bytes  魔数 "SML1"
//! offset 4   4 bytes  校验和（CRC-32，覆盖其后的全部字节）
//! offset 8.. 段序列：1 字节类型，4 字节负载长度，N 字节负载
//! ```
//!
//! # 段类型
//!
//! | 类型 | 含义 | 记录 | 效果 |
//! |------|------|------|------|
//! | 0 | 注释 | 任意字节 | 跳过 |
//! | 1 | 单精度顶点表 | 3×f32 | 替换当前顶点池 |
//! | 2 | 双精度顶点表 | 3×f64 | 替换当前顶点池 |
//! | 3 | 三角形表 | 3×u32 | 追加 (a,b,c) |
//! | 4 | 四边形表 | 4×u32 | 追加 (a,b,c) 和 (a,c,d) |
//! | 5 | 三角形带 | 3×u32 种子 + 每步 1×u32 | 交替展开 |

use crate::core::config::ChecksumPolicy;
use crate::core::error::{FormatError, Result};
use crate::geometry::vertex::Vertex;
use crate::loader_warn;

/// 文件头魔数
pub const SML_MAGIC: [u8; 4] = *b"SML1";

/// 文件头长度（魔数 + 校验和）
pub const HEADER_LEN: usize = 8;

/// 段头长度（类型 + 负载长度）
pub const SEGMENT_HEADER_LEN: usize = 5;

/// 段类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentKind {
    /// 注释，负载被整体跳过
    Comment,
    /// 单精度顶点表
    FloatVertices,
    /// 双精度顶点表
    DoubleVertices,
    /// 三角形表
    Triangles,
    /// 四边形表
    Quads,
    /// 三角形带
    TriangleStrip,
}

impl SegmentKind {
    /// 由类型字节解析，未知类型返回 `None`
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(SegmentKind::Comment),
            1 => Some(SegmentKind::FloatVertices),
            2 => Some(SegmentKind::DoubleVertices),
            3 => Some(SegmentKind::Triangles),
            4 => Some(SegmentKind::Quads),
            5 => Some(SegmentKind::TriangleStrip),
            _ => None,
        }
    }

    /// 类型字节
    pub fn tag(self) -> u8 {
        match self {
            SegmentKind::Comment => 0,
            SegmentKind::FloatVertices => 1,
            SegmentKind::DoubleVertices => 2,
            SegmentKind::Triangles => 3,
            SegmentKind::Quads => 4,
            SegmentKind::TriangleStrip => 5,
        }
    }

    /// 每条记录的字节数（三角形带按单个索引计）
    pub fn record_size(self) -> usize {
        match self {
            SegmentKind::Comment => 1,
            SegmentKind::FloatVertices => 12,
            SegmentKind::DoubleVertices => 24,
            SegmentKind::Triangles => 12,
            SegmentKind::Quads => 16,
            SegmentKind::TriangleStrip => 4,
        }
    }

    /// 获取类型名称
    pub fn name(self) -> &'static str {
        match self {
            SegmentKind::Comment => "comment",
            SegmentKind::FloatVertices => "float vertices",
            SegmentKind::DoubleVertices => "double vertices",
            SegmentKind::Triangles => "triangles",
            SegmentKind::Quads => "quads",
            SegmentKind::TriangleStrip => "triangle strip",
        }
    }
}

/// 一个已切分的段
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    /// 段类型
    pub kind: SegmentKind,
    /// 段头在文件中的偏移
    pub offset: usize,
    /// 负载
    pub payload: &'a [u8],
}

/// 解码得到的三角形顶点流
///
/// 长度恒为 3×T，每 3 个连续元素构成一个三角形，保持原始绕序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleStream {
    vertices: Vec<Vertex>,
}

impl TriangleStream {
    /// 创建空的顶点流
    pub fn new() -> Self {
        Self::default()
    }

    /// 由三角形列表构建（主要用于测试和基准）
    pub fn from_triangles<I>(triangles: I) -> Self
    where
        I: IntoIterator<Item = [Vertex; 3]>,
    {
        let mut stream = Self::new();
        for triangle in triangles {
            stream.push_triangle(triangle);
        }
        stream
    }

    /// 追加一个三角形
    #[inline]
    pub fn push_triangle(&mut self, triangle: [Vertex; 3]) {
        self.vertices.extend_from_slice(&triangle);
    }

    /// 三角形数量
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// 顶点数量（3×T）
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// 以切片形式访问
    pub fn as_slice(&self) -> &[Vertex] {
        &self.vertices
    }

    /// 遍历三角形
    pub fn triangles(&self) -> impl Iterator<Item = [Vertex; 3]> + '_ {
        self.vertices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// 取出内部向量
    pub fn into_vertices(self) -> Vec<Vertex> {
        self.vertices
    }
}

/// 当前顶点池
///
/// 每个顶点表段产生一个新的池，整体替换旧池；拓扑段只借用它。
#[derive(Debug, Default)]
struct VertexPool {
    vertices: Vec<Vertex>,
}

impl VertexPool {
    #[inline]
    fn get(&self, index: u32) -> Result<Vertex> {
        self.vertices.get(index as usize).copied().ok_or_else(|| {
            FormatError::IndexOutOfRange {
                index,
                pool_len: self.vertices.len(),
            }
            .into()
        })
    }

    fn triangle(&self, indices: [u32; 3]) -> Result<[Vertex; 3]> {
        Ok([
            self.get(indices[0])?,
            self.get(indices[1])?,
            self.get(indices[2])?,
        ])
    }
}

/// 有界的小端字节读取器
struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(data: &'a [u8], pos: usize) -> Self {
        Self { data, pos }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn take(&mut self, n: usize, segment_offset: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(FormatError::TruncatedSegment {
                offset: segment_offset,
                needed: n,
                available: self.remaining(),
            }
            .into());
        }
        let bytes = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(bytes)
    }

    fn next_segment(&mut self) -> Result<Segment<'a>> {
        let offset = self.pos;
        let header = self.take(SEGMENT_HEADER_LEN, offset)?;
        let tag = header[0];
        let len = read_u32(&header[1..5]) as usize;

        let kind = SegmentKind::from_tag(tag)
            .ok_or(FormatError::UnknownSegment { tag, offset })?;
        let payload = self.take(len, offset)?;

        Ok(Segment {
            kind,
            offset,
            payload,
        })
    }
}

#[inline]
fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[inline]
fn read_f32(bytes: &[u8]) -> f32 {
    f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

#[inline]
fn read_f64(bytes: &[u8]) -> f64 {
    f64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

fn read_indices<const N: usize>(record: &[u8]) -> [u32; N] {
    let mut indices = [0u32; N];
    for (i, index) in indices.iter_mut().enumerate() {
        *index = read_u32(&record[i * 4..i * 4 + 4]);
    }
    indices
}

/// 计算 SML 校验和（CRC-32，覆盖文件头之后的全部字节）
pub fn compute_checksum(data: &[u8]) -> u32 {
    crc32fast::hash(data.get(HEADER_LEN..).unwrap_or(&[]))
}

/// SML 分段解码器
///
/// # 使用示例
///
/// ```rust
/// use sml_render::core::config::ChecksumPolicy;
/// use sml_render::geometry::decoder::SegmentDecoder;
///
/// let mut bytes = b"SML1".to_vec();
/// bytes.extend_from_slice(&0u32.to_le_bytes());
///
/// let stream = SegmentDecoder::new(ChecksumPolicy::Ignore).decode(&bytes)?;
/// assert!(stream.is_empty());
/// # Ok::<(), sml_render::core::error::SmlError>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentDecoder {
    checksum: ChecksumPolicy,
}

impl SegmentDecoder {
    /// 创建解码器
    pub fn new(checksum: ChecksumPolicy) -> Self {
        Self { checksum }
    }

    /// 解码完整的 SML 字节流
    ///
    /// 遇到第一个格式错误即停止，后续段不再处理。
    pub fn decode(&self, data: &[u8]) -> Result<TriangleStream> {
        self.check_header(data)?;

        let mut reader = ByteReader::new(data, HEADER_LEN);
        let mut pool = VertexPool::default();
        let mut stream = TriangleStream::new();

        while !reader.is_at_end() {
            let segment = reader.next_segment()?;
            tracing::debug!(
                kind = segment.kind.name(),
                offset = segment.offset,
                len = segment.payload.len(),
                "decoding segment"
            );

            match segment.kind {
                SegmentKind::Comment => {}
                SegmentKind::FloatVertices => {
                    pool = decode_float_vertices(segment.payload);
                }
                SegmentKind::DoubleVertices => {
                    pool = decode_double_vertices(segment.payload);
                }
                SegmentKind::Triangles => {
                    expand_triangles(segment.payload, &pool, &mut stream)?;
                }
                SegmentKind::Quads => {
                    expand_quads(segment.payload, &pool, &mut stream)?;
                }
                SegmentKind::TriangleStrip => {
                    expand_strip(&segment, &pool, &mut stream)?;
                }
            }
        }

        if u32::try_from(stream.len()).is_err() {
            return Err(FormatError::StreamTooLarge {
                vertices: stream.len(),
            }
            .into());
        }

        Ok(stream)
    }

    fn check_header(&self, data: &[u8]) -> Result<()> {
        let magic = data.get(..4).unwrap_or(data);
        if magic != SML_MAGIC.as_slice() {
            return Err(FormatError::BadMagic {
                found: magic.to_vec(),
            }
            .into());
        }

        let stored = data
            .get(4..HEADER_LEN)
            .map(read_u32)
            .ok_or(FormatError::MissingChecksum)?;

        if self.checksum == ChecksumPolicy::Ignore {
            return Ok(());
        }

        let computed = compute_checksum(data);
        if stored != computed {
            match self.checksum {
                ChecksumPolicy::Strict => {
                    return Err(FormatError::ChecksumMismatch { stored, computed }.into());
                }
                _ => {
                    loader_warn!(stored, computed, "SML 校验和不匹配，继续加载");
                }
            }
        }

        Ok(())
    }
}

fn decode_float_vertices(payload: &[u8]) -> VertexPool {
    let vertices = payload
        .chunks_exact(SegmentKind::FloatVertices.record_size())
        .map(|r| Vertex::from_f32([read_f32(&r[0..4]), read_f32(&r[4..8]), read_f32(&r[8..12])]))
        .collect();
    VertexPool { vertices }
}

fn decode_double_vertices(payload: &[u8]) -> VertexPool {
    let vertices = payload
        .chunks_exact(SegmentKind::DoubleVertices.record_size())
        .map(|r| Vertex::new(read_f64(&r[0..8]), read_f64(&r[8..16]), read_f64(&r[16..24])))
        .collect();
    VertexPool { vertices }
}

fn expand_triangles(payload: &[u8], pool: &VertexPool, stream: &mut TriangleStream) -> Result<()> {
    for record in payload.chunks_exact(SegmentKind::Triangles.record_size()) {
        stream.push_triangle(pool.triangle(read_indices::<3>(record))?);
    }
    Ok(())
}

fn expand_quads(payload: &[u8], pool: &VertexPool, stream: &mut TriangleStream) -> Result<()> {
    for record in payload.chunks_exact(SegmentKind::Quads.record_size()) {
        let [a, b, c, d] = read_indices::<4>(record);
        stream.push_triangle(pool.triangle([a, b, c])?);
        stream.push_triangle(pool.triangle([a, c, d])?);
    }
    Ok(())
}

/// 三角形带展开
///
/// 种子 (v0,v1,v2) 之后的第 i 个索引（i 从 3 开始）：i 为奇数时 v0 ← v2，
/// 偶数时 v1 ← v2，然后 v2 ← 新索引。种子 (0,1,2) 接 3,4,5 得到
/// (0,1,2) (2,1,3) (2,3,4) (4,3,5)，相邻三角形绕序一致。
fn expand_strip(segment: &Segment<'_>, pool: &VertexPool, stream: &mut TriangleStream) -> Result<()> {
    let payload = segment.payload;
    if payload.len() < 12 {
        return Err(FormatError::ShortStrip {
            offset: segment.offset,
            len: payload.len(),
        }
        .into());
    }

    let mut indices = read_indices::<3>(&payload[..12]);
    stream.push_triangle(pool.triangle(indices)?);

    for (step, record) in payload[12..].chunks_exact(4).enumerate() {
        let i = step + 3;
        indices[if i % 2 == 1 { 0 } else { 1 }] = indices[2];
        indices[2] = read_u32(record);
        stream.push_triangle(pool.triangle(indices)?);
    }

    Ok(())
}
