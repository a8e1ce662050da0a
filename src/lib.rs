//! SML Render - SML 网格加载库
//!
//! 把自定义的分段二进制网格格式 "SML" 转换为可直接渲染的索引三角形网格：
//! 去重后的顶点缓冲区和三角形索引缓冲区。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（日志、配置、错误处理）
//! - `geometry`: 几何体模块（顶点、网格、解码、去重、组装、加载器）
//! - `loading`: 后台加载（工作线程与加载结果）
//!
//! # 使用示例
//!
//! ```no_run
//! use sml_render::core::config::LoaderConfig;
//! use sml_render::loading::{load_blocking, LoadRequest};
//!
//! let response = load_blocking(LoadRequest::new("model.sml"), &LoaderConfig::default());
//! if let Some(mesh) = response.into_mesh() {
//!     println!("{} 个三角形", mesh.triangle_count());
//! }
//! ```

pub mod core;
pub mod geometry;
pub mod loading;
