//! 后台加载模块
//!
//! 把一次加载（解码 → 去重 → 组装）作为一个工作单元放到独立的工作线程上，
//! 并向调用方报告恰好一个结果：
//!
//! - [`LoadResponse::Loaded`]：成功，携带网格、文件名、重新加载标志和统计
//! - [`LoadResponse::EmptyMesh`]：格式正确但没有三角形
//! - [`LoadResponse::MissingFile`]：文件无法打开或读取
//! - [`LoadResponse::BadFormat`]：数据无法识别或已损坏
//!
//! 内部一致性错误不是用户可见的结果：工作线程记录错误日志后 panic，
//! [`LoadHandle::wait`] 会在调用方线程上恢复这个 panic。
//!
//! 加载器不做重试，也不修改调用方的状态；并发请求由调用方自行串行化。
//!
//! # 使用示例
//!
//! ```rust,no_run
//! use sml_render::core::config::LoaderConfig;
//! use sml_render::loading::{spawn_load, LoadRequest, LoadResponse};
//!
//! let handle = spawn_load(LoadRequest::new("model.sml"), &LoaderConfig::default())?;
//!
//! match handle.wait() {
//!     LoadResponse::Loaded { filename, mesh, .. } => {
//!         println!("{}: {} 个三角形", filename, mesh.triangle_count());
//!     }
//!     other => println!("加载失败: {}", other.kind()),
//! }
//! # Ok::<(), sml_render::core::error::SmlError>(())
//! ```

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use crossbeam_channel::{bounded, Receiver, TryRecvError};

use crate::core::config::LoaderConfig;
use crate::core::error::{Result, SmlError};
use crate::geometry::loaders::{LoadStats, SmlLoader};
use crate::geometry::mesh::Mesh;
use crate::{loader_error, loader_info, loader_warn};

/// 工作线程名称
const WORKER_NAME: &str = "sml-loader";

/// 一次加载请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    /// 要加载的文件
    pub path: PathBuf,
    /// 是否为重新加载（调用方据此决定是否保留相机等状态）
    pub is_reload: bool,
}

impl LoadRequest {
    /// 首次加载
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_reload: false,
        }
    }

    /// 重新加载
    pub fn reload(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            is_reload: true,
        }
    }
}

/// 加载结果
#[derive(Debug, Clone, PartialEq)]
pub enum LoadResponse {
    /// 加载成功
    Loaded {
        /// 来源文件名
        filename: String,
        /// 索引网格，所有权转移给调用方
        mesh: Mesh,
        /// 与请求中的标志一致
        is_reload: bool,
        /// 各阶段统计
        stats: LoadStats,
    },

    /// 文件格式正确但没有任何三角形
    EmptyMesh { path: PathBuf },

    /// 文件无法打开或读取
    MissingFile { path: PathBuf, reason: String },

    /// 数据无法识别或已损坏
    BadFormat { path: PathBuf, reason: String },
}

impl LoadResponse {
    /// 是否加载成功
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadResponse::Loaded { .. })
    }

    /// 结果类别名称
    pub fn kind(&self) -> &'static str {
        match self {
            LoadResponse::Loaded { .. } => "loaded",
            LoadResponse::EmptyMesh { .. } => "empty mesh",
            LoadResponse::MissingFile { .. } => "missing file",
            LoadResponse::BadFormat { .. } => "bad format",
        }
    }

    /// 取出网格
    pub fn into_mesh(self) -> Option<Mesh> {
        match self {
            LoadResponse::Loaded { mesh, .. } => Some(mesh),
            _ => None,
        }
    }
}

/// 后台加载句柄
///
/// 结果通过容量为 1 的通道送达。
#[derive(Debug)]
pub struct LoadHandle {
    receiver: Receiver<LoadResponse>,
    worker: JoinHandle<()>,
}

impl LoadHandle {
    /// 阻塞直到结果送达
    ///
    /// 工作线程因内部一致性错误 panic 时，在当前线程恢复该 panic。
    pub fn wait(self) -> LoadResponse {
        let LoadHandle { receiver, worker } = self;
        let response = receiver.recv();

        if let Err(payload) = worker.join() {
            std::panic::resume_unwind(payload);
        }

        match response {
            Ok(response) => response,
            Err(_) => panic!("加载线程退出但没有发送结果"),
        }
    }

    /// 非阻塞地获取结果
    ///
    /// 结果尚未送达时把句柄原样返回。
    pub fn try_response(self) -> std::result::Result<LoadResponse, LoadHandle> {
        match self.receiver.try_recv() {
            Ok(response) => {
                // 结果已发送，线程即将退出
                let _ = self.worker.join();
                Ok(response)
            }
            Err(TryRecvError::Empty) => Err(self),
            Err(TryRecvError::Disconnected) => Ok(self.wait()),
        }
    }

    /// 工作线程是否已经结束
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }
}

/// 在工作线程上加载，结果通过返回的句柄获取
///
/// 只有在无法创建线程时返回错误。
pub fn spawn_load(request: LoadRequest, config: &LoaderConfig) -> Result<LoadHandle> {
    let config = config.clone();
    spawn_worker(move || execute(&request, &config))
}

/// 在工作线程上加载，并在该线程上用结果调用 `callback`
///
/// 调用方无需轮询；返回的线程句柄可用于等待回调完成。
pub fn spawn_load_with<F>(
    request: LoadRequest,
    config: &LoaderConfig,
    callback: F,
) -> Result<JoinHandle<()>>
where
    F: FnOnce(LoadResponse) + Send + 'static,
{
    let config = config.clone();
    let worker = std::thread::Builder::new()
        .name(WORKER_NAME.into())
        .spawn(move || callback(execute(&request, &config)))?;
    Ok(worker)
}

/// 在当前线程上加载
pub fn load_blocking(request: LoadRequest, config: &LoaderConfig) -> LoadResponse {
    execute(&request, config)
}

fn spawn_worker<F>(job: F) -> Result<LoadHandle>
where
    F: FnOnce() -> LoadResponse + Send + 'static,
{
    let (sender, receiver) = bounded(1);
    let worker = std::thread::Builder::new()
        .name(WORKER_NAME.into())
        .spawn(move || {
            // 调用方可能已经丢弃句柄
            let _ = sender.send(job());
        })?;

    Ok(LoadHandle { receiver, worker })
}

fn execute(request: &LoadRequest, config: &LoaderConfig) -> LoadResponse {
    loader_info!(
        "加载请求: {} (重新加载: {})",
        request.path.display(),
        request.is_reload
    );
    let result = SmlLoader::new(config).load_path(&request.path);
    classify(request, result)
}

/// 把流水线结果映射为四种结果之一
fn classify(request: &LoadRequest, result: Result<(Mesh, LoadStats)>) -> LoadResponse {
    let path = request.path.clone();

    match result {
        Ok((mesh, stats)) => LoadResponse::Loaded {
            filename: display_name(&path),
            mesh,
            is_reload: request.is_reload,
            stats,
        },
        Err(SmlError::EmptyMesh) => {
            loader_warn!("网格为空: {}", path.display());
            LoadResponse::EmptyMesh { path }
        }
        Err(err @ (SmlError::FileUnreadable { .. } | SmlError::Io(_))) => {
            loader_warn!("无法读取文件: {}", err);
            LoadResponse::MissingFile {
                path,
                reason: err.to_string(),
            }
        }
        Err(err) if err.is_format() => {
            loader_warn!("文件格式错误: {}: {}", path.display(), err);
            LoadResponse::BadFormat {
                path,
                reason: err.to_string(),
            }
        }
        Err(err) => {
            loader_error!("加载 {} 时发生内部错误: {}", path.display(), err);
            panic!("internal fault while loading {}: {}", path.display(), err);
        }
    }
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}
