//! 相机取景
//!
//! 根据模型包围盒计算预设视角和"适配模型"视角。所有计算都是同步的纯函数，
//! 只有 `fit` 记录上一次应用的触发值以实现边沿触发。

use serde::{Deserialize, Serialize};

use crate::core::config::CameraConfig;
use crate::core::math::{constants, max_component, Point3, Quaternion, Vector3};
use crate::geometry::bounds::compute_bounds;
use crate::geometry::node::SceneNode;

/// 预设视角
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraPreset {
    Front,
    Side,
    Top,
    ThreeQuarter,
}

impl CameraPreset {
    pub const ALL: [CameraPreset; 4] = [
        CameraPreset::Front,
        CameraPreset::Side,
        CameraPreset::Top,
        CameraPreset::ThreeQuarter,
    ];

    /// 按名称解析（`front` / `side` / `top` / `three-quarter`）
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "front" => Some(CameraPreset::Front),
            "side" => Some(CameraPreset::Side),
            "top" => Some(CameraPreset::Top),
            "three-quarter" | "three_quarter" => Some(CameraPreset::ThreeQuarter),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CameraPreset::Front => "front",
            CameraPreset::Side => "side",
            CameraPreset::Top => "top",
            CameraPreset::ThreeQuarter => "three-quarter",
        }
    }
}

/// 相机变换：位置和注视点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraTransform {
    pub position: Point3,
    pub look_at: Point3,
}

impl CameraTransform {
    /// 轨道控制器的目标点，始终与注视点一致
    #[inline]
    pub fn orbit_target(&self) -> Point3 {
        self.look_at
    }

    /// 相机到注视点的距离
    pub fn distance(&self) -> f32 {
        (self.position - self.look_at).norm()
    }
}

/// 相机取景器
#[derive(Debug, Clone, Default)]
pub struct CameraFramer {
    config: CameraConfig,
    /// 上一次应用的适配触发值，0 表示从未应用
    last_fit_trigger: u64,
}

impl CameraFramer {
    pub fn new(config: CameraConfig) -> Self {
        Self {
            config,
            last_fit_trigger: 0,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    /// 取景中心和距离
    ///
    /// 有模型时 `distance = max(sx, sy, sz, min_extent) * factor`；
    /// 没有模型时中心为原点，距离为默认值。
    fn frame(&self, model: Option<&SceneNode>, factor: f32) -> (Point3, f32) {
        match model {
            Some(model) => {
                let bounds = compute_bounds(model);
                let distance = max_component(&bounds.size, self.config.min_extent) * factor;
                (Point3::from(bounds.center), distance)
            }
            None => (Point3::origin(), self.config.default_distance),
        }
    }

    fn diagonal(&self, center: Point3, distance: f32) -> Point3 {
        let offset = distance * self.config.diagonal_factor;
        center + Vector3::new(offset, offset, offset)
    }

    /// 计算预设视角
    pub fn preset_transform(&self, model: Option<&SceneNode>, preset: CameraPreset) -> CameraTransform {
        let (center, distance) = self.frame(model, self.config.preset_distance_factor);
        let front = Vector3::new(distance, 0.0, 0.0);

        let position = match preset {
            CameraPreset::Front => center + front,
            CameraPreset::Side => {
                // 正面偏移绕中心的竖直轴旋转 90 度
                let rotation = Quaternion::from_axis_angle(&Vector3::y_axis(), constants::HALF_PI);
                center + rotation * front
            }
            CameraPreset::Top => center + Vector3::new(0.0, distance, 0.0),
            CameraPreset::ThreeQuarter => self.diagonal(center, distance),
        };

        tracing::debug!(preset = preset.name(), distance, "Camera preset framed");

        CameraTransform {
            position,
            look_at: center,
        }
    }

    /// 没有待处理请求（`None`）时不返回任何变换
    pub fn apply_preset(&self, model: Option<&SceneNode>, preset: Option<CameraPreset>) -> Option<CameraTransform> {
        preset.map(|preset| self.preset_transform(model, preset))
    }

    /// 计算适配模型的视角
    pub fn fit_transform(&self, model: &SceneNode) -> CameraTransform {
        let (center, distance) = self.frame(Some(model), self.config.fit_distance_factor);
        CameraTransform {
            position: self.diagonal(center, distance),
            look_at: center,
        }
    }

    /// 边沿触发的适配
    ///
    /// 触发值为 0、没有模型或触发值自上次应用后没有变化时返回 `None`。
    /// 没有模型时触发值不被消耗，模型就绪后同一触发值仍会生效。
    pub fn fit(&mut self, model: Option<&SceneNode>, trigger: u64) -> Option<CameraTransform> {
        if trigger == 0 || trigger == self.last_fit_trigger {
            return None;
        }
        let model = model?;

        self.last_fit_trigger = trigger;
        let transform = self.fit_transform(model);
        tracing::debug!(trigger, distance = transform.distance(), "Camera fitted to model");
        Some(transform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Matrix4;
    use crate::geometry::material::Material;
    use crate::geometry::mesh::Geometry;
    use approx::assert_relative_eq;

    /// 以 `center` 为中心、边长为 `size` 的立方体（只用两个对角点）
    fn cube(center: [f32; 3], size: f32) -> SceneNode {
        let h = size / 2.0;
        SceneNode::group("Model").with_child(
            SceneNode::mesh(
                "Cube",
                Geometry::with_positions(vec![[-h, -h, -h], [h, h, h], [h, -h, h]]),
                vec![Material::new("Default").shared()],
            )
            .with_transform(Matrix4::new_translation(&Vector3::new(center[0], center[1], center[2]))),
        )
    }

    fn assert_point(actual: Point3, expected: [f32; 3]) {
        assert_relative_eq!(actual, Point3::new(expected[0], expected[1], expected[2]), epsilon = 1e-5);
    }

    #[test]
    fn test_fit_two_unit_cube_at_origin() {
        let framer = CameraFramer::default();
        let transform = framer.fit_transform(&cube([0.0, 0.0, 0.0], 2.0));

        assert_point(transform.position, [3.5, 3.5, 3.5]);
        assert_point(transform.look_at, [0.0, 0.0, 0.0]);
        assert_eq!(transform.orbit_target(), transform.look_at);
    }

    #[test]
    fn test_small_models_use_minimum_extent() {
        let framer = CameraFramer::default();
        let transform = framer.fit_transform(&cube([0.0, 0.0, 0.0], 0.1));

        // max(0.1, 1) * 2.5 * 0.7
        assert_point(transform.position, [1.75, 1.75, 1.75]);
    }

    #[test]
    fn test_presets_without_model() {
        let framer = CameraFramer::default();

        let front = framer.preset_transform(None, CameraPreset::Front);
        assert_point(front.position, [5.0, 0.0, 0.0]);
        assert_point(front.look_at, [0.0, 0.0, 0.0]);

        let top = framer.preset_transform(None, CameraPreset::Top);
        assert_point(top.position, [0.0, 5.0, 0.0]);

        let three_quarter = framer.preset_transform(None, CameraPreset::ThreeQuarter);
        assert_point(three_quarter.position, [3.5, 3.5, 3.5]);
    }

    #[test]
    fn test_side_rotates_around_model_center() {
        let framer = CameraFramer::default();
        let model = cube([10.0, 2.0, -4.0], 3.0);

        let front = framer.preset_transform(Some(&model), CameraPreset::Front);
        let side = framer.preset_transform(Some(&model), CameraPreset::Side);

        // distance = 3 * 2
        assert_point(front.position, [16.0, 2.0, -4.0]);
        assert_point(side.position, [10.0, 2.0, -10.0]);
        assert_point(side.look_at, [10.0, 2.0, -4.0]);
        assert_relative_eq!(side.distance(), front.distance(), epsilon = 1e-5);
    }

    #[test]
    fn test_pending_preset() {
        let framer = CameraFramer::default();
        assert!(framer.apply_preset(None, None).is_none());
        assert!(framer.apply_preset(None, Some(CameraPreset::Front)).is_some());
    }

    #[test]
    fn test_fit_is_edge_triggered() {
        let mut framer = CameraFramer::default();
        let model = cube([0.0, 0.0, 0.0], 2.0);

        assert!(framer.fit(Some(&model), 0).is_none());
        assert!(framer.fit(Some(&model), 1).is_some());
        assert!(framer.fit(Some(&model), 1).is_none());
        assert!(framer.fit(Some(&model), 2).is_some());
    }

    #[test]
    fn test_fit_waits_for_model() {
        let mut framer = CameraFramer::default();
        let model = cube([0.0, 0.0, 0.0], 2.0);

        assert!(framer.fit(None, 1).is_none());
        assert!(framer.fit(Some(&model), 1).is_some());
    }

    #[test]
    fn test_preset_names() {
        for preset in CameraPreset::ALL {
            assert_eq!(CameraPreset::from_name(preset.name()), Some(preset));
        }
        assert_eq!(CameraPreset::from_name("isometric"), None);
    }
}
