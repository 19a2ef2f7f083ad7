//! 数学类型模块
//!
//! 基于 `nalgebra` 提供查看器使用的向量和矩阵类型别名，以及少量几何工具函数。

pub use nalgebra::{
    Matrix4 as Mat4, Point3 as Pt3, UnitQuaternion, Vector3 as Vec3,
};

// 类型别名，使用更简洁的名称
pub type Vector3 = Vec3<f32>;
pub type Point3 = Pt3<f32>;
pub type Matrix4 = Mat4<f32>;
pub type Quaternion = UnitQuaternion<f32>;

/// 数学常量
pub mod constants {
    /// π/2
    pub const HALF_PI: f32 = std::f32::consts::FRAC_PI_2;

    /// 浮点数比较的 epsilon
    pub const EPSILON: f32 = 1e-6;
}

/// 三个分量和下限中的最大值
#[inline]
pub fn max_component(v: &Vector3, floor: f32) -> f32 {
    v.x.max(v.y).max(v.z).max(floor)
}
