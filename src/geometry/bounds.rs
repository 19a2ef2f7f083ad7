//! 包围盒计算
//!
//! 计算任意场景子树在世界空间中的轴对齐包围盒（AABB），
//! 以中心点和各轴尺寸表示。

use serde::Serialize;

use super::node::SceneNode;
use crate::core::math::{Matrix4, Point3, Vector3};

/// 轴对齐包围盒（最小/最大角点）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vector3,
    pub max: Vector3,
}

impl Aabb {
    /// 空包围盒（min > max，不包含任何点）
    pub fn empty() -> Self {
        Self {
            min: Vector3::repeat(f32::INFINITY),
            max: Vector3::repeat(f32::NEG_INFINITY),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// 扩展以包含一个点
    #[inline]
    pub fn expand(&mut self, point: &Vector3) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn center(&self) -> Vector3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }
}

/// 以中心和尺寸表示的包围盒
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub center: Vector3,
    pub size: Vector3,
}

impl Bounds {
    /// 退化包围盒：中心和尺寸都是零向量
    pub fn zero() -> Self {
        Self {
            center: Vector3::zeros(),
            size: Vector3::zeros(),
        }
    }
}

impl From<Aabb> for Bounds {
    fn from(aabb: Aabb) -> Self {
        if aabb.is_empty() {
            Self::zero()
        } else {
            Self {
                center: aabb.center(),
                size: aabb.size(),
            }
        }
    }
}

/// 计算子树中所有几何体的世界空间包围盒
pub fn compute_aabb(node: &SceneNode) -> Aabb {
    let mut aabb = Aabb::empty();

    node.traverse_world(&Matrix4::identity(), &mut |child, world| {
        let Some(positions) = child.as_mesh().and_then(|mesh| mesh.geometry.positions.as_ref()) else {
            return;
        };
        for p in positions {
            let world_point = world.transform_point(&Point3::new(p[0], p[1], p[2]));
            aabb.expand(&world_point.coords);
        }
    });

    aabb
}

/// 计算子树包围盒的中心和尺寸
///
/// 子树中没有几何体时返回零中心、零尺寸，而不是错误。
pub fn compute_bounds(node: &SceneNode) -> Bounds {
    compute_aabb(node).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::mesh::Geometry;
    use approx::assert_relative_eq;

    fn unit_cube_corners() -> Vec<[f32; 3]> {
        vec![[-1.0, -1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]]
    }

    #[test]
    fn test_empty_subtree_is_zero() {
        let bounds = compute_bounds(&SceneNode::group("Empty"));
        assert_eq!(bounds, Bounds::zero());

        // 没有位置属性的网格同样不贡献包围盒
        let tree = SceneNode::group("Root").with_child(SceneNode::mesh("NoPos", Geometry::new(), Vec::new()));
        assert_eq!(compute_bounds(&tree), Bounds::zero());
    }

    #[test]
    fn test_bounds_of_single_mesh() {
        let tree = SceneNode::mesh("Cube", Geometry::with_positions(unit_cube_corners()), Vec::new());
        let bounds = compute_bounds(&tree);

        assert_relative_eq!(bounds.center, Vector3::zeros());
        assert_relative_eq!(bounds.size, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn test_bounds_apply_world_transforms() {
        let tree = SceneNode::group("Root")
            .with_transform(Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0)))
            .with_child(
                SceneNode::mesh("Cube", Geometry::with_positions(unit_cube_corners()), Vec::new())
                    .with_transform(Matrix4::new_scaling(2.0)),
            );
        let bounds = compute_bounds(&tree);

        assert_relative_eq!(bounds.center, Vector3::new(10.0, 0.0, 0.0));
        assert_relative_eq!(bounds.size, Vector3::new(4.0, 4.0, 4.0));
    }

    #[test]
    fn test_bounds_span_multiple_meshes() {
        let tree = SceneNode::group("Root")
            .with_child(SceneNode::mesh(
                "A",
                Geometry::with_positions(vec![[0.0, 0.0, 0.0]]),
                Vec::new(),
            ))
            .with_child(SceneNode::mesh(
                "B",
                Geometry::with_positions(vec![[4.0, 2.0, 6.0]]),
                Vec::new(),
            ));
        let bounds = compute_bounds(&tree);

        assert_relative_eq!(bounds.center, Vector3::new(2.0, 1.0, 3.0));
        assert_relative_eq!(bounds.size, Vector3::new(4.0, 2.0, 6.0));
    }
}
