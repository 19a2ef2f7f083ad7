//! 场景节点
//!
//! 场景图是一棵所有权树：每个节点独占其子节点。节点是否携带几何体
//! 在构造时由 `NodeKind` 决定，遍历时不需要运行时类型检查。

use super::material::MaterialRef;
use super::mesh::Geometry;
use crate::core::math::Matrix4;

/// 网格节点的负载：几何体和一个或多个材质
#[derive(Debug, Clone)]
pub struct Mesh {
    pub geometry: Geometry,

    /// 材质列表（多材质网格按顺序排列）
    pub materials: Vec<MaterialRef>,
}

impl Mesh {
    pub fn new(geometry: Geometry, materials: Vec<MaterialRef>) -> Self {
        Self { geometry, materials }
    }
}

/// 节点类型
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// 纯分组节点
    Group,
    /// 携带几何体的网格节点
    Mesh(Mesh),
}

/// 场景节点
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,

    /// 相对父节点的局部变换
    pub transform: Matrix4,

    pub kind: NodeKind,

    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// 创建分组节点
    pub fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::identity(),
            kind: NodeKind::Group,
            children: Vec::new(),
        }
    }

    /// 创建网格节点
    pub fn mesh(name: impl Into<String>, geometry: Geometry, materials: Vec<MaterialRef>) -> Self {
        Self {
            name: name.into(),
            transform: Matrix4::identity(),
            kind: NodeKind::Mesh(Mesh::new(geometry, materials)),
            children: Vec::new(),
        }
    }

    /// 设置局部变换
    pub fn with_transform(mut self, transform: Matrix4) -> Self {
        self.transform = transform;
        self
    }

    /// 添加子节点
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// 获取网格负载
    #[inline]
    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            NodeKind::Group => None,
        }
    }

    #[inline]
    pub fn has_geometry(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    #[inline]
    pub fn has_material(&self) -> bool {
        self.as_mesh().is_some_and(|mesh| !mesh.materials.is_empty())
    }

    /// 深度优先遍历（先序），包括自身
    pub fn traverse<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a SceneNode),
    {
        visit(self);
        for child in &self.children {
            child.traverse(visit);
        }
    }

    /// 深度优先遍历，同时提供累积的世界变换
    pub fn traverse_world<'a, F>(&'a self, parent: &Matrix4, visit: &mut F)
    where
        F: FnMut(&'a SceneNode, &Matrix4),
    {
        let world = parent * self.transform;
        visit(self, &world);
        for child in &self.children {
            child.traverse_world(&world, visit);
        }
    }

    /// 子树中的节点总数
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |_| count += 1);
        count
    }
}
