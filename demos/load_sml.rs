/// SML 模型加载示例
///
/// 演示如何使用 geometry 模块加载 SML 文件，并查看各阶段统计。
///
/// 运行方式：
/// ```
/// cargo run --example load_sml -- assets/sphere.sml
/// ```

use sml_render::core::config::LoaderConfig;
use sml_render::geometry::loaders::SmlLoader;
use std::path::PathBuf;

fn main() {
    // 初始化日志系统
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    println!("=== SML 加载器示例 ===\n");

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("assets/sphere.sml"));

    println!("正在加载: {}", path.display());

    let loader = SmlLoader::new(&LoaderConfig::default());
    match loader.load_path(&path) {
        Ok((mesh, stats)) => {
            println!("\n✓ 加载成功！\n");

            println!("网格信息:");
            println!("  顶点数: {}", mesh.vertex_count());
            println!("  索引数: {}", mesh.index_count());
            println!("  三角形数: {}", mesh.triangle_count());
            println!("  去重比例: {:.3}", stats.dedup_ratio());

            if let Some(bounds) = mesh.bounds() {
                println!("  包围盒: {:?} - {:?}", bounds.min, bounds.max);
            }

            println!("\n阶段耗时（{} 线程）:", stats.threads);
            println!("  解码: {:?}", stats.decode_time);
            println!("  去重: {:?}", stats.dedup_time);
            println!("  组装: {:?}", stats.assemble_time);

            // 显示前几个三角形
            println!("\n三角形（前 {} 个）:", mesh.triangle_count().min(3));
            for (i, triangle) in mesh.triangles().take(3).enumerate() {
                println!("  三角形 {}: {:?}", i, triangle);
            }
        }
        Err(e) => {
            eprintln!("\n✗ 加载失败: {}", e);
            std::process::exit(1);
        }
    }
}
