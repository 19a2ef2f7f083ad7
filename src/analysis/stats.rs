//! 模型统计
//!
//! 组合几何统计与包围盒，生成每次成功加载对应的一份 `ModelStatistics`。

use serde::Serialize;

use super::census::census;
use crate::geometry::bounds::compute_bounds;
use crate::geometry::node::SceneNode;

/// 模型统计信息
///
/// 加载成功后计算一次，之后不再修改。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ModelStatistics {
    pub vertex_count: u64,
    pub triangle_count: u64,
    pub mesh_count: u64,
    pub material_count: u64,

    /// 包围盒尺寸
    pub width: f32,
    pub height: f32,
    pub depth: f32,

    /// 去重材质的贴图显存估算（字节）
    pub texture_memory_bytes: u64,
}

/// 计算模型统计
pub fn compute_model_stats(model: &SceneNode) -> ModelStatistics {
    let counts = census(model);
    let bounds = compute_bounds(model);

    ModelStatistics {
        vertex_count: counts.vertices,
        triangle_count: counts.triangles,
        mesh_count: counts.meshes,
        material_count: counts.material_count,
        width: bounds.size.x,
        height: bounds.size.y,
        depth: bounds.size.z,
        texture_memory_bytes: counts.texture_memory_bytes,
    }
}
