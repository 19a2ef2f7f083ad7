//! 性能评分模块
//!
//! 根据模型统计和原始文件大小计算 0-100 的启发式评分，
//! 并生成优化建议和格式化后的大小标签。评分是纯函数，没有失败分支。

use serde::Serialize;

use super::stats::ModelStatistics;
use crate::core::config::ScoringConfig;

/// 三角形数量过多时的建议
pub const TIP_REDUCE_TRIANGLES: &str = "Consider reducing triangle count for better performance";
/// 文件过大时的建议
pub const TIP_COMPRESS: &str = "Reduce file size by compressing textures or using Draco compression";
/// 无问题时的结论
pub const TIP_WELL_OPTIMIZED: &str = "Model is well optimized for web viewing";
/// 无具体问题但评分偏低时的建议
pub const TIP_REDUCE_TEXTURES: &str = "Reduce texture resolution to improve performance";

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// 性能报告
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerformanceReport {
    /// 评分，范围 [0, 100]
    pub score: u32,
    pub file_size_label: String,
    pub texture_memory_label: String,
    pub triangle_count: u64,
    /// 有序建议列表，至少包含一项
    pub tips: Vec<String>,
}

impl PerformanceReport {
    /// 评分等级文字，供展示层着色
    pub fn grade(&self) -> &'static str {
        match self.score {
            80..=100 => "good",
            50..=79 => "fair",
            _ => "poor",
        }
    }
}

/// 性能评分器
#[derive(Debug, Clone, Default)]
pub struct PerformanceScorer {
    config: ScoringConfig,
}

impl PerformanceScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// 计算性能报告
    ///
    /// 从 100 开始，三角形和文件大小两项独立扣分，结果限制在 [0, 100]。
    /// 没有产生建议时根据评分补充一条结论，所以建议列表永远非空。
    pub fn score(&self, stats: &ModelStatistics, file_size_bytes: u64) -> PerformanceReport {
        let config = &self.config;
        let mut tips = Vec::new();
        let mut score: i32 = 100;

        if stats.triangle_count > config.triangle_budget {
            score -= config.triangle_penalty;
            tips.push(TIP_REDUCE_TRIANGLES.to_string());
        } else if stats.triangle_count > config.triangle_warning {
            score -= config.triangle_warning_penalty;
        }

        if file_size_bytes > config.file_size_budget {
            score -= config.file_size_penalty;
            tips.push(TIP_COMPRESS.to_string());
        } else if file_size_bytes > config.file_size_warning {
            score -= config.file_size_warning_penalty;
        }

        let score = score.clamp(0, 100);

        if tips.is_empty() {
            if score >= config.good_score {
                tips.push(TIP_WELL_OPTIMIZED.to_string());
            } else {
                tips.push(TIP_REDUCE_TEXTURES.to_string());
            }
        }

        PerformanceReport {
            score: score as u32,
            file_size_label: format_file_size(file_size_bytes),
            texture_memory_label: format_texture_memory(stats.texture_memory_bytes),
            triangle_count: stats.triangle_count,
            tips,
        }
    }
}

/// 使用默认阈值计算性能报告
pub fn score(stats: &ModelStatistics, file_size_bytes: u64) -> PerformanceReport {
    PerformanceScorer::default().score(stats, file_size_bytes)
}

/// 文件大小标签：不小于 1 MiB 时为 `"X.XX MB"`，否则为 `"X.X KB"`
pub fn format_file_size(bytes: u64) -> String {
    let megabytes = bytes as f64 / MIB;
    if megabytes >= 1.0 {
        format!("{} MB", to_fixed(megabytes, 2))
    } else {
        format!("{} KB", to_fixed(bytes as f64 / KIB, 1))
    }
}

/// 贴图显存标签
///
/// 先按 KiB 四舍五入；不小于 1024 KiB 时显示 `"X.X MB"`，否则显示整数 `"N KB"`。
pub fn format_texture_memory(bytes: u64) -> String {
    let kilobytes = (bytes as f64 / KIB).round();
    if kilobytes >= 1024.0 {
        format!("{} MB", to_fixed(kilobytes / 1024.0, 1))
    } else {
        format!("{} KB", kilobytes as u64)
    }
}

/// 固定小数位格式化，恰好落在中点时向上舍入
fn to_fixed(value: f64, decimals: i32) -> String {
    let scale = 10f64.powi(decimals);
    let rounded = (value * scale).round() / scale;
    format!("{:.*}", decimals as usize, rounded)
}
