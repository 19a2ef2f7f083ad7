//! 查看器相机
//!
//! 相机位置加轨道控制器目标点。取景器计算出的 `CameraTransform`
//! 通过 `apply` 立即生效，视图矩阵在下次读取时重建。

use super::framer::CameraTransform;
use crate::core::math::{constants, Matrix4, Point3, Vector3};

/// 查看器相机
#[derive(Debug, Clone)]
pub struct ViewerCamera {
    /// 相机位置
    position: Point3,

    /// 轨道控制器目标点（同时也是注视点）
    target: Point3,

    view_matrix: Matrix4,

    /// 视图矩阵是否需要更新
    view_dirty: bool,
}

impl ViewerCamera {
    /// 创建相机，默认位于 (5, 5, 5) 注视原点
    pub fn new() -> Self {
        Self {
            position: Point3::new(5.0, 5.0, 5.0),
            target: Point3::origin(),
            view_matrix: Matrix4::identity(),
            view_dirty: true,
        }
    }

    pub fn position(&self) -> Point3 {
        self.position
    }

    /// 轨道控制器目标点
    pub fn target(&self) -> Point3 {
        self.target
    }

    /// 指向目标点的单位向量
    pub fn look(&self) -> Vector3 {
        (self.target - self.position).normalize()
    }

    /// 应用取景结果：设置位置，注视点和轨道目标同步到变换的目标点
    pub fn apply(&mut self, transform: &CameraTransform) {
        self.position = transform.position;
        self.target = transform.orbit_target();
        self.view_dirty = true;
    }

    /// 当前状态对应的相机变换
    pub fn transform(&self) -> CameraTransform {
        CameraTransform {
            position: self.position,
            look_at: self.target,
        }
    }

    /// 获取视图矩阵
    pub fn view_matrix(&mut self) -> Matrix4 {
        if self.view_dirty {
            self.update_view_matrix();
        }
        self.view_matrix
    }

    /// 重建右手系 look-at 视图矩阵
    ///
    /// 视线与世界上向量平行（俯视）时改用 -Z 作为上向量。
    fn update_view_matrix(&mut self) {
        let direction = self.target - self.position;
        let world_up = Vector3::y();
        let up = if direction.cross(&world_up).norm() <= constants::EPSILON {
            -Vector3::z()
        } else {
            world_up
        };

        self.view_matrix = Matrix4::look_at_rh(&self.position, &self.target, &up);
        self.view_dirty = false;
    }
}

impl Default for ViewerCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_syncs_orbit_target() {
        let mut camera = ViewerCamera::new();
        let transform = CameraTransform {
            position: Point3::new(3.5, 3.5, 3.5),
            look_at: Point3::new(0.0, 1.0, 0.0),
        };

        camera.apply(&transform);

        assert_eq!(camera.position(), transform.position);
        assert_eq!(camera.target(), Point3::new(0.0, 1.0, 0.0));
        assert_eq!(camera.transform(), transform);
    }

    #[test]
    fn test_view_matrix_moves_target_in_front() {
        let mut camera = ViewerCamera::new();
        camera.apply(&CameraTransform {
            position: Point3::new(5.0, 0.0, 0.0),
            look_at: Point3::origin(),
        });

        let view = camera.view_matrix();
        let target_in_view = view.transform_point(&Point3::origin());

        // 右手系相机看向 -Z
        assert_relative_eq!(target_in_view, Point3::new(0.0, 0.0, -5.0), epsilon = 1e-5);
    }

    #[test]
    fn test_top_down_view_is_finite() {
        let mut camera = ViewerCamera::new();
        camera.apply(&CameraTransform {
            position: Point3::new(0.0, 5.0, 0.0),
            look_at: Point3::origin(),
        });

        let view = camera.view_matrix();
        assert!(view.iter().all(|v| v.is_finite()));
        // 上向量退化为 -Z：相机右方向仍是 +X
        assert_relative_eq!(view.transform_vector(&Vector3::x()), Vector3::x(), epsilon = 1e-5);
        assert_relative_eq!(camera.look(), Vector3::new(0.0, -1.0, 0.0));
    }
}
