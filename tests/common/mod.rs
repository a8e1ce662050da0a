//! 集成测试共用的 SML 字节构建器

#![allow(dead_code)]

/// 按段拼装 SML 字节流
pub struct SmlBuilder {
    body: Vec<u8>,
}

impl SmlBuilder {
    pub fn new() -> Self {
        Self { body: Vec::new() }
    }

    pub fn segment(mut self, tag: u8, payload: &[u8]) -> Self {
        self.body.push(tag);
        self.body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        self.body.extend_from_slice(payload);
        self
    }

    pub fn float_vertices(self, vertices: &[[f32; 3]]) -> Self {
        let payload: Vec<u8> = vertices
            .iter()
            .flatten()
            .flat_map(|c| c.to_le_bytes())
            .collect();
        self.segment(1, &payload)
    }

    pub fn double_vertices(self, vertices: &[[f64; 3]]) -> Self {
        let payload: Vec<u8> = vertices
            .iter()
            .flatten()
            .flat_map(|c| c.to_le_bytes())
            .collect();
        self.segment(2, &payload)
    }

    pub fn indices(self, tag: u8, indices: &[u32]) -> Self {
        let payload: Vec<u8> = indices.iter().flat_map(|i| i.to_le_bytes()).collect();
        self.segment(tag, &payload)
    }

    pub fn build(self) -> Vec<u8> {
        let mut bytes = b"SML1".to_vec();
        bytes.extend_from_slice(&crc32fast::hash(&self.body).to_le_bytes());
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

pub const UNIT_SQUARE: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];

/// 写入临时文件
pub fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    file.write_all(bytes).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}
