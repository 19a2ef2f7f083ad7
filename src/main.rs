//! ModelViewer - 模型分析命令行
//!
//! 加载一个模型文件，输出统计信息、性能报告和适配取景的相机变换。
//!
//! # 使用方法
//!
//! ```bash
//! # 使用配置文件 config.toml（可选）
//! cargo run -- helmet.glb
//!
//! # 额外输出一个预设视角
//! cargo run -- helmet.glb --preset three-quarter
//! ```
//!
//! # 架构概览
//!
//! ```text
//! ┌─────────────┐
//! │   main.rs   │  命令行入口
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ ModelLoader │  按扩展名分派解码器
//! └──────┬──────┘
//!        │
//!   ┌────┴─────┐
//!   │          │
//! ┌─▼──────┐ ┌─▼──────┐
//! │Analysis│ │ Camera │  统计/评分 与 取景
//! └────────┘ └────────┘
//! ```

use anyhow::{bail, Context};
use tracing::{error, info};

use model_viewer::analysis::PerformanceScorer;
use model_viewer::camera::{CameraFramer, CameraPreset, ViewerCamera};
use model_viewer::core::{log, Config};
use model_viewer::geometry::loaders::{ModelFile, ModelLoader};

/// 命令行参数
struct Args {
    path: String,
    preset: Option<CameraPreset>,
}

impl Args {
    /// 解析命令行参数
    ///
    /// - `<path>`: 模型文件路径
    /// - `--preset <name>`: front / side / top / three-quarter
    fn parse<I: Iterator<Item = String>>(mut args: I) -> anyhow::Result<Self> {
        let mut path = None;
        let mut preset = None;

        while let Some(arg) = args.next() {
            if arg == "--preset" {
                let name = args.next().context("--preset 需要一个视角名称")?;
                preset = Some(
                    CameraPreset::from_name(&name).with_context(|| format!("未知的视角: {}", name))?,
                );
            } else if path.is_none() {
                path = Some(arg);
            } else {
                bail!("多余的参数: {}", arg);
            }
        }

        Ok(Self {
            path: path.context("用法: model_viewer <模型文件> [--preset <视角>]")?,
            preset,
        })
    }
}

fn run(config: Config, args: Args) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.path).with_context(|| format!("无法读取文件: {}", args.path))?;
    let name = std::path::Path::new(&args.path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(&args.path)
        .to_string();
    let file = ModelFile::new(name, bytes);

    let loader = ModelLoader::new(config.loader.clone());
    let loaded = pollster::block_on(loader.load(file, |progress| {
        tracing::debug!(progress, "Loading progress");
    }))
    .map_err(|e| {
        error!("{}", e.user_message());
        e
    })?;

    let report = loaded.performance(&PerformanceScorer::new(config.scoring.clone()));

    let mut framer = CameraFramer::new(config.camera.clone());
    let mut camera = ViewerCamera::new();
    if let Some(fit) = framer.fit(Some(&loaded.model), 1) {
        camera.apply(&fit);
    }

    info!(
        score = report.score,
        grade = report.grade(),
        "Performance report ready"
    );

    println!("Format:      {}", loaded.format);
    println!("Vertices:    {}", loaded.stats.vertex_count);
    println!("Triangles:   {}", loaded.stats.triangle_count);
    println!("Meshes:      {}", loaded.stats.mesh_count);
    println!("Materials:   {}", loaded.stats.material_count);
    println!(
        "Dimensions:  {:.2} x {:.2} x {:.2}",
        loaded.stats.width, loaded.stats.height, loaded.stats.depth
    );
    println!("File size:   {}", report.file_size_label);
    println!("Textures:    {}", report.texture_memory_label);
    println!("Score:       {} ({})", report.score, report.grade());
    for tip in &report.tips {
        println!("  - {}", tip);
    }
    println!(
        "Fit camera:  position {} -> target {}",
        camera.position(),
        camera.target()
    );

    if let Some(preset) = framer.apply_preset(Some(&loaded.model), args.preset) {
        println!(
            "Preset {}:  position {} -> target {}",
            args.preset.map_or("", |p| p.name()),
            preset.position,
            preset.look_at
        );
    }

    Ok(())
}

/// 应用程序入口点
///
/// # 初始化流程
///
/// 1. 加载配置文件（config.toml，缺失时使用默认值）
/// 2. 验证配置
/// 3. 初始化日志系统
/// 4. 解析命令行参数并加载模型
fn main() -> anyhow::Result<()> {
    // 1. 加载配置（在初始化日志之前）
    let config = Config::from_file_or_default("config.toml");

    // 2. 验证配置
    config.validate().context("Invalid configuration")?;

    // 3. 初始化日志系统（使用配置中的设置）
    let log_file = if config.logging.file_output {
        Some(config.logging.log_file.as_str())
    } else {
        None
    };
    log::init_logger(config.logging.level, config.logging.file_output, log_file)
        .context("Failed to initialize logger")?;
    info!(version = env!("CARGO_PKG_VERSION"), "ModelViewer starting...");

    // 4. 解析参数并运行
    let args = Args::parse(std::env::args().skip(1))?;
    run(config, args)
}
