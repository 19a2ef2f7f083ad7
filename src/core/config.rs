//! 配置管理模块
//!
//! 提供查看器核心配置的加载、解析和管理功能。
//! 支持从 TOML 配置文件加载，所有字段都有默认值。
//!
//! # 配置文件格式 (config.toml)
//!
//! ```toml
//! [logging]
//! level = "info"      # trace, debug, info, warn, error
//! file_output = false
//!
//! [loader]
//! chunk_size = 65536
//! indeterminate_progress = 50.0
//!
//! [camera]
//! default_distance = 5.0
//! preset_distance_factor = 2.0
//! fit_distance_factor = 2.5
//!
//! [scoring]
//! triangle_budget = 100000
//! file_size_budget = 5242880
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::{ConfigError, Result};

/// 查看器配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingConfig,

    /// 加载器配置
    #[serde(default)]
    pub loader: LoaderConfig,

    /// 相机取景配置
    #[serde(default)]
    pub camera: CameraConfig,

    /// 性能评分配置
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// 是否输出到文件
    #[serde(default = "default_file_output")]
    pub file_output: bool,

    /// 日志文件路径
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

/// 日志级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/// 加载器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// 每次从字节流读取的块大小（字节）
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// 总长度未知时报告的进度值
    #[serde(default = "default_indeterminate_progress")]
    pub indeterminate_progress: f32,
}

/// 相机取景配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// 没有模型时预设视角使用的距离
    #[serde(default = "default_camera_distance")]
    pub default_distance: f32,

    /// 预设视角距离 = 最大尺寸 * 该系数
    #[serde(default = "default_preset_factor")]
    pub preset_distance_factor: f32,

    /// 适配模型距离 = 最大尺寸 * 该系数
    #[serde(default = "default_fit_factor")]
    pub fit_distance_factor: f32,

    /// 斜视角在每个轴上的偏移比例
    #[serde(default = "default_diagonal_factor")]
    pub diagonal_factor: f32,

    /// 参与最大尺寸计算的下限
    #[serde(default = "default_min_extent")]
    pub min_extent: f32,
}

/// 性能评分配置
///
/// 默认值即评分算法的标准阈值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// 超过该三角形数量时扣除 `triangle_penalty` 并给出建议
    #[serde(default = "default_triangle_budget")]
    pub triangle_budget: u64,

    /// 超过该三角形数量时扣除 `triangle_warning_penalty`
    #[serde(default = "default_triangle_warning")]
    pub triangle_warning: u64,

    #[serde(default = "default_triangle_penalty")]
    pub triangle_penalty: i32,

    #[serde(default = "default_minor_penalty")]
    pub triangle_warning_penalty: i32,

    /// 超过该文件大小（字节）时扣除 `file_size_penalty` 并给出建议
    #[serde(default = "default_file_size_budget")]
    pub file_size_budget: u64,

    /// 超过该文件大小（字节）时扣除 `file_size_warning_penalty`
    #[serde(default = "default_file_size_warning")]
    pub file_size_warning: u64,

    #[serde(default = "default_file_size_penalty")]
    pub file_size_penalty: i32,

    #[serde(default = "default_minor_penalty")]
    pub file_size_warning_penalty: i32,

    /// 无建议时判定为"已优化"的最低分
    #[serde(default = "default_good_score")]
    pub good_score: i32,
}

// 默认值函数
fn default_log_level() -> LogLevel { LogLevel::Info }
fn default_file_output() -> bool { false }
fn default_log_file() -> String { "model_viewer.log".to_string() }
fn default_chunk_size() -> usize { 64 * 1024 }
fn default_indeterminate_progress() -> f32 { 50.0 }
fn default_camera_distance() -> f32 { 5.0 }
fn default_preset_factor() -> f32 { 2.0 }
fn default_fit_factor() -> f32 { 2.5 }
fn default_diagonal_factor() -> f32 { 0.7 }
fn default_min_extent() -> f32 { 1.0 }
fn default_triangle_budget() -> u64 { 100_000 }
fn default_triangle_warning() -> u64 { 50_000 }
fn default_triangle_penalty() -> i32 { 25 }
fn default_file_size_budget() -> u64 { 5 * 1024 * 1024 }
fn default_file_size_warning() -> u64 { 2 * 1024 * 1024 }
fn default_file_size_penalty() -> i32 { 20 }
fn default_minor_penalty() -> i32 { 10 }
fn default_good_score() -> i32 { 80 }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file_output: default_file_output(),
            log_file: default_log_file(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            indeterminate_progress: default_indeterminate_progress(),
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            default_distance: default_camera_distance(),
            preset_distance_factor: default_preset_factor(),
            fit_distance_factor: default_fit_factor(),
            diagonal_factor: default_diagonal_factor(),
            min_extent: default_min_extent(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            triangle_budget: default_triangle_budget(),
            triangle_warning: default_triangle_warning(),
            triangle_penalty: default_triangle_penalty(),
            triangle_warning_penalty: default_minor_penalty(),
            file_size_budget: default_file_size_budget(),
            file_size_warning: default_file_size_warning(),
            file_size_penalty: default_file_size_penalty(),
            file_size_warning_penalty: default_minor_penalty(),
            good_score: default_good_score(),
        }
    }
}

impl Config {
    /// 从配置文件加载
    ///
    /// # 示例
    ///
    /// ```no_run
    /// use model_viewer::core::Config;
    ///
    /// let config = Config::from_file("config.toml")?;
    /// # Ok::<(), model_viewer::core::ViewerError>(())
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let contents = std::fs::read_to_string(path)
            .map_err(|_| ConfigError::FileNotFound(path_str.clone()))?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(e.to_string()).into())
    }

    /// 从配置文件加载，如果文件不存在或无效则使用默认配置
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                // 日志系统此时通常尚未初始化
                eprintln!("Failed to load config '{}': {}, using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        if self.loader.chunk_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "loader.chunk_size".to_string(),
                reason: "Chunk size must be greater than 0".to_string(),
            }
            .into());
        }

        if !(0.0..=100.0).contains(&self.loader.indeterminate_progress) {
            return Err(ConfigError::InvalidValue {
                field: "loader.indeterminate_progress".to_string(),
                reason: "Progress must be within 0-100".to_string(),
            }
            .into());
        }

        let camera = &self.camera;
        for (field, value) in [
            ("camera.default_distance", camera.default_distance),
            ("camera.preset_distance_factor", camera.preset_distance_factor),
            ("camera.fit_distance_factor", camera.fit_distance_factor),
            ("camera.min_extent", camera.min_extent),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "Value must be greater than 0".to_string(),
                }
                .into());
            }
        }

        if self.scoring.triangle_warning > self.scoring.triangle_budget
            || self.scoring.file_size_warning > self.scoring.file_size_budget
        {
            return Err(ConfigError::InvalidValue {
                field: "scoring".to_string(),
                reason: "Warning thresholds must not exceed budgets".to_string(),
            }
            .into());
        }

        Ok(())
    }
}
