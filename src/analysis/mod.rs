//! 模型分析模块
//!
//! 加载完成后的纯计算部分：几何/材质统计、模型统计信息和性能评分。
//!
//! ```text
//! SceneNode ──► census + bounds ──► ModelStatistics ──► PerformanceReport
//! ```

pub mod census;
pub mod stats;
pub mod performance;

pub use census::{census, Census};
pub use stats::{compute_model_stats, ModelStatistics};
pub use performance::{score, PerformanceReport, PerformanceScorer};
