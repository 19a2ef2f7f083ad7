//! ModelViewer - 3D 模型查看器核心
//!
//! 负责模型文件的导入、统计、性能评分和相机取景。
//! 渲染和界面由展示层负责，本库只输出可序列化的纯数据。
//!
//! # 模块结构
//!
//! - `core`: 核心功能模块（数学、日志、配置、错误处理）
//! - `geometry`: 场景树、包围盒以及 GLB/glTF/OBJ/FBX 加载器
//! - `analysis`: 几何/材质统计和性能评分
//! - `camera`: 预设视角、适配取景和查看器相机
//!
//! # 使用示例
//!
//! ```no_run
//! use model_viewer::analysis::score;
//! use model_viewer::camera::CameraFramer;
//! use model_viewer::geometry::loaders::{ModelFile, ModelLoader};
//!
//! let file = ModelFile::new("helmet.glb", std::fs::read("helmet.glb")?);
//! let size = file.size();
//! let loaded = pollster::block_on(ModelLoader::default().load(file, |_| {}))?;
//!
//! let report = score(&loaded.stats, size);
//! println!("评分: {} {:?}", report.score, report.tips);
//!
//! let fit = CameraFramer::default().fit_transform(&loaded.model);
//! println!("相机位置: {}", fit.position);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod geometry;
pub mod analysis;
pub mod camera;
