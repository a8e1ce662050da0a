//! SML Render - 命令行网格加载器
//!
//! 在后台线程上加载一个 SML 网格文件，并通过日志报告加载结果。
//! 不创建窗口，也不渲染。
//!
//! # 使用方法
//!
//! ```bash
//! # 加载配置文件中的默认模型
//! cargo run
//!
//! # 加载指定文件，使用 4 个线程，严格校验
//! cargo run -- model.sml --threads 4 --checksum strict
//! ```
//!
//! # 命令行参数
//!
//! - `<path>`: 要加载的文件（缺省时使用 `loader.default_model`）
//! - `--threads <value>`: 排序去重的线程预算
//! - `--checksum <ignore|warn|strict>`: 校验和策略
//! - `--verbose`: debug 级别日志

use anyhow::{bail, Context};
use sml_render::core::{log, Config};
use sml_render::loading::{spawn_load, LoadRequest, LoadResponse};
use tracing::info;

/// 带参数值的选项
const VALUE_FLAGS: &[&str] = &["--threads", "--checksum"];

fn main() -> anyhow::Result<()> {
    // 1. 加载配置（在初始化日志之前）
    let mut config = Config::from_file_or_default("config.toml");

    // 2. 应用命令行参数
    let args: Vec<String> = std::env::args().collect();
    config.apply_args(&args);

    // 3. 验证配置
    config.validate().context("Invalid configuration")?;

    // 4. 初始化日志系统
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file);
    info!(version = env!("CARGO_PKG_VERSION"), "SML Render starting...");

    // 5. 确定要加载的文件
    let path = model_path(args.get(1..).unwrap_or_default())
        .unwrap_or_else(|| config.loader.default_model.clone());
    info!(
        path = %path,
        threads = config.loader.thread_budget(),
        checksum = ?config.loader.checksum,
        "Loader configuration"
    );

    // 6. 后台加载并等待结果
    let handle = spawn_load(LoadRequest::new(&path), &config.loader)
        .context("Failed to start loader thread")?;

    match handle.wait() {
        LoadResponse::Loaded {
            filename,
            mesh,
            stats,
            ..
        } => {
            info!(
                file = %filename,
                vertices = mesh.vertex_count(),
                triangles = mesh.triangle_count(),
                ratio = stats.dedup_ratio(),
                elapsed = ?stats.total_time(),
                "Mesh loaded"
            );
            if let Some(bounds) = mesh.bounds() {
                info!(
                    center = ?bounds.center(),
                    diagonal = bounds.diagonal(),
                    "Mesh bounds"
                );
            }
            Ok(())
        }
        LoadResponse::EmptyMesh { path } => bail!("{}: mesh is empty", path.display()),
        LoadResponse::MissingFile { reason, .. } => bail!("{}", reason),
        LoadResponse::BadFormat { path, reason } => {
            bail!("{}: bad format: {}", path.display(), reason)
        }
    }
}

/// 第一个位置参数（跳过选项及其参数值）
fn model_path(args: &[String]) -> Option<String> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if !arg.starts_with("--") {
            return Some(arg.clone());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_model_path_positional() {
        assert_eq!(model_path(&args(&["mesh.sml"])), Some("mesh.sml".to_string()));
    }

    #[test]
    fn test_model_path_skips_flag_values() {
        let list = args(&["--threads", "4", "--verbose", "mesh.sml"]);
        assert_eq!(model_path(&list), Some("mesh.sml".to_string()));
    }

    #[test]
    fn test_model_path_empty_argv() {
        let argv: Vec<String> = Vec::new();
        assert_eq!(model_path(argv.get(1..).unwrap_or_default()), None);
    }

    #[test]
    fn test_model_path_absent() {
        assert_eq!(model_path(&args(&["--checksum", "strict"])), None);
    }
}
