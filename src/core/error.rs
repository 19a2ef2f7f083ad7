//! 错误处理模块
//!
//! 定义了查看器核心使用的统一错误类型，使用 `thiserror` 提供友好的错误消息。
//!
//! # 错误分类
//!
//! - `LoadError`：单次加载的终止性错误（不支持的格式、解码失败）
//! - `DecodeError`：解码器内部的详细错误，只用于日志，不直接暴露给界面
//! - `ConfigError`：配置文件相关错误
//!
//! 统计、包围盒、评分和相机取景都是全函数，没有错误分支。

use crate::geometry::loaders::ModelFormat;

/// 查看器统一的 Result 类型
pub type Result<T> = std::result::Result<T, ViewerError>;

/// 查看器顶层错误类型
#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// 模型加载错误
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 日志系统错误
    #[error("Log error: {0}")]
    Log(String),
}

/// 单次模型加载的终止性错误
///
/// 两种错误都不会自动重试；返回前传输句柄已经释放。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// 扩展名不在支持列表中，未获取任何资源
    #[error("Unsupported format: .{extension}")]
    UnsupportedFormat { extension: String },

    /// 解码器报告失败
    #[error("Failed to load {format}")]
    DecodeFailure { format: ModelFormat },
}

impl LoadError {
    /// 面向用户的提示文本
    pub fn user_message(&self) -> String {
        match self {
            LoadError::UnsupportedFormat { .. } => {
                "Unsupported format. Use .glb, .gltf, .obj, or .fbx".to_string()
            }
            LoadError::DecodeFailure { format } => format!("Failed to load {} model", format),
        }
    }
}

/// 解码器内部错误
///
/// 对应具体格式解析时遇到的问题，加载器会记录日志后转换为
/// `LoadError::DecodeFailure`。
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// 解析失败
    #[error("Failed to parse model: {0}")]
    Parse(String),

    /// 几何数据无效
    #[error("Invalid geometry data: {0}")]
    InvalidGeometry(String),

    /// 外部库错误
    #[error("External library error: {0}")]
    ExternalLibrary(String),

    /// 读取字节流失败
    #[error("Transfer failed: {0}")]
    Io(#[from] std::io::Error),
}

/// 配置相关的错误
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 配置文件未找到
    #[error("Config file not found: {0}")]
    FileNotFound(String),

    /// 配置文件解析失败
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// 配置值无效
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
