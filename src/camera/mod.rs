//! 相机模块
//!
//! - `framer`: 由模型包围盒计算预设视角和适配视角
//! - `viewer_camera`: 应用取景结果的查看器相机

pub mod framer;
pub mod viewer_camera;

pub use framer::{CameraFramer, CameraPreset, CameraTransform};
pub use viewer_camera::ViewerCamera;
