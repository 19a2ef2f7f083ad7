//! 几何与材质统计
//!
//! 遍历场景子树，统计顶点、三角形、网格实例和去重后的材质数量，
//! 并根据绑定贴图的尺寸估算显存占用。

use std::collections::HashSet;
use std::sync::Arc;

use crate::geometry::material::{Material, MaterialRef};
use crate::geometry::node::SceneNode;

/// 子树统计结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Census {
    pub vertices: u64,

    /// 所有网格三角形估算之和取整后的值
    pub triangles: u64,

    pub meshes: u64,

    #[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::material::Texture;
    use crate::geometry::mesh::Geometry;

    fn positions(count: usize) -> Vec<[f32; 3]> {
        (0..count).map(|i| [i as f32, 0.0, 0.0]).collect()
    }

    #[test]
    fn test_empty_scene() {
        assert_eq!(census(&SceneNode::group("Empty")), Census::default());
    }

    #[test]
    fn test_mixed_indexed_and_non_indexed_round_total_only() {
        // 非索引网格各贡献 4/3 个三角形，三个网格合计 4，而逐个取整会得到 3
        let mut root = SceneNode::group("Root");
        for i in 0..3 {
            root.add_child(SceneNode::mesh(
                format!("Loose{}", i),
                Geometry::with_positions(positions(4)),
                Vec::new(),
            ));
        }
        // 索引网格：4 个顶点，6 个索引 -> 2 个三角形
        root.add_child(SceneNode::mesh(
            "Indexed",
            Geometry::with_positions(positions(4)).indexed(vec![0, 1, 2, 0, 2, 3]),
            Vec::new(),
        ));

        let result = census(&root);
        assert_eq!(result.meshes, 4);
        assert_eq!(result.vertices, 16);
        assert_eq!(result.triangles, 6);
    }

    #[test]
    fn test_index_path_preferred_over_vertex_fallback() {
        // 索引复用顶点：3 个顶点但 9 个索引 -> 3 个三角形，而不是 1 个
        let tree = SceneNode::mesh(
            "Fan",
            Geometry::with_positions(positions(3)).indexed(vec![0, 1, 2, 0, 2, 1, 1, 2, 0]),
            Vec::new(),
        );

        assert_eq!(census(&tree).triangles, 3);
    }

    #[test]
    fn test_mesh_without_positions_degrades_to_zero() {
        let tree = SceneNode::group("Root")
            .with_child(SceneNode::mesh(
                "Broken",
                Geometry {
                    indices: Some(vec![0, 1, 2]),
                    ..Geometry::default()
                },
                Vec::new(),
            ))
            .with_child(SceneNode::mesh("Ok", Geometry::with_positions(positions(3)), Vec::new()));

        let result = census(&tree);
        assert_eq!(result.meshes, 2);
        assert_eq!(result.vertices, 3);
        assert_eq!(result.triangles, 1);
    }

    #[test]
    fn test_shared_material_counts_once() {
        let shared = Material::new("Shared").shared();
        let tree = SceneNode::group("Root")
            .with_child(SceneNode::mesh("A", Geometry::new(), vec![Arc::clone(&shared)]))
            .with_child(SceneNode::mesh("B", Geometry::new(), vec![Arc::clone(&shared)]));

        assert_eq!(census(&tree).material_count, 1);
    }

    #[test]
    fn test_distinct_materials_count_separately() {
        // 字段相同但引用不同，仍然计为两个
        let tree = SceneNode::group("Root")
            .with_child(SceneNode::mesh("A", Geometry::new(), vec![Material::new("Same").shared()]))
            .with_child(SceneNode::mesh("B", Geometry::new(), vec![Material::new("Same").shared()]));

        assert_eq!(census(&tree).material_count, 2);
    }

    #[test]
    fn test_multi_material_mesh() {
        let a = Material::new("A").shared();
        let b = Material::new("B").shared();
        let tree = SceneNode::group("Root")
            .with_child(SceneNode::mesh("Multi", Geometry::new(), vec![Arc::clone(&a), Arc::clone(&b)]))
            .with_child(SceneNode::mesh("Single", Geometry::new(), vec![Arc::clone(&b)]));

        assert_eq!(census(&tree).material_count, 2);
    }

    #[test]
    fn test_texture_memory_counts_distinct_materials() {
        let textured = Material::new("Textured")
            .with_base_color_map(Texture::decoded(256, 256))
            .with_normal_map(Texture::decoded(128, 128))
            .shared();
        let external = Material::new("External")
            .with_base_color_map(Texture::unresolved("missing.png"))
            .shared();
        let tree = SceneNode::group("Root")
            .with_child(SceneNode::mesh("A", Geometry::new(), vec![Arc::clone(&textured)]))
            .with_child(SceneNode::mesh("B", Geometry::new(), vec![Arc::clone(&textured), external]));

        assert_eq!(census(&tree).texture_memory_bytes, 256 * 256 * 4 + 128 * 128 * 4);
    }
}
