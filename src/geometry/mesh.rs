/// 网格几何数据模块
///
/// 定义CPU侧的几何缓冲区，存储解码器产出的顶点属性和可选的索引缓冲区。
/// 与渲染库无关，只用于统计和包围盒计算。

/// 几何缓冲区
///
/// 每个属性都是可选的：解码器可能产出没有法线、没有UV，
/// 甚至没有位置属性的几何体（后者在统计时贡献为 0）。
///
/// # 示例
///
/// ```rust
/// use model_viewer::geometry::Geometry;
///
/// let triangle = Geometry::with_positions(vec![
///     [0.0, 0.0, 0.0],
///     [1.0, 0.0, 0.0],
///     [0.0, 0.0, 1.0],
/// ])
/// .indexed(vec![0, 1, 2]);
///
/// assert_eq!(triangle.vertex_count(), 3);
/// assert_eq!(triangle.triangle_estimate(), 1.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    /// 顶点位置 (x, y, z)
    pub positions: Option<Vec<[f32; 3]>>,

    /// 每顶点法线
    pub normals: Option<Vec<[f32; 3]>>,

    /// 每顶点纹理坐标 (u, v)
    pub uvs: Option<Vec<[f32; 2]>>,

    /// 三角形顶点索引，每3个索引定义一个三角形
    ///
    /// 索引可以复用顶点，因此三角形数量不能由顶点数推导。
    pub indices: Option<Vec<u32>>,
}

impl Geometry {
    /// 创建一个空的几何体（没有任何属性）
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建只有位置属性的几何体
    pub fn with_positions(positions: Vec<[f32; 3]>) -> Self {
        Self {
            positions: Some(positions),
            ..Self::default()
        }
    }

    /// 附加索引缓冲区
    pub fn indexed(mut self, indices: Vec<u32>) -> Self {
        self.indices = Some(indices);
        self
    }

    /// 附加法线属性
    pub fn with_normals(mut self, normals: Vec<[f32; 3]>) -> Self {
        self.normals = Some(normals);
        self
    }

    /// 附加UV属性
    pub fn with_uvs(mut self, uvs: Vec<[f32; 2]>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    /// 是否存在位置属性
    #[inline]
    pub fn has_positions(&self) -> bool {
        self.positions.is_some()
    }

    /// 获取顶点数量（没有位置属性时为 0）
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.as_ref().map_or(0, Vec::len)
    }

    /// 获取索引数量
    #[inline]
    pub fn index_count(&self) -> Option<usize> {
        self.indices.as_ref().map(Vec::len)
    }

    /// 估算三角形数量（未取整）
    ///
    /// 优先使用索引缓冲区：`索引数 / 3`；没有索引时退化为 `顶点数 / 3`，
    /// 这假设顶点按三角形三元组平铺，对 strip/fan 拓扑只是近似。
    /// 没有位置属性的几何体返回 0。
    pub fn triangle_estimate(&self) -> f64 {
        if !self.has_positions() {
            return 0.0;
        }
        match self.index_count() {
            Some(count) => count as f64 / 3.0,
            None => self.vertex_count() as f64 / 3.0,
        }
    }

    /// 验证几何数据的有效性
    ///
    /// 检查属性长度一致以及索引是否越界。解码器可以用它拒绝损坏的数据，
    /// 统计流程本身不依赖它。
    pub fn validate(&self) -> Result<(), String> {
        let vertex_count = self.vertex_count();

        if let Some(normals) = &self.normals {
            if normals.len() != vertex_count {
                return Err(format!(
                    "法线数量 {} 与顶点数量 {} 不一致",
                    normals.len(),
                    vertex_count
                ));
            }
        }

        if let Some(uvs) = &self.uvs {
            if uvs.len() != vertex_count {
                return Err(format!(
                    "UV数量 {} 与顶点数量 {} 不一致",
                    uvs.len(),
                    vertex_count
                ));
            }
        }

        if let Some(indices) = &self.indices {
            if let Some(i) = indices
                .iter()
                .position(|&index| index as usize >= vertex_count)
            {
                return Err(format!(
                    "索引 {} 处的值 {} 超出顶点范围 (共 {} 个顶点)",
                    i, indices[i], vertex_count
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad_positions() -> Vec<[f32; 3]> {
        vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]
    }

    #[test]
    fn test_empty_geometry() {
        let geometry = Geometry::new();

        assert_eq!(geometry.vertex_count(), 0);
        assert_eq!(geometry.index_count(), None);
        assert_eq!(geometry.triangle_estimate(), 0.0);
    }

    #[test]
    fn test_indexed_triangles_reuse_vertices() {
        // 4 个顶点，两个三角形共享一条边
        let geometry = Geometry::with_positions(quad_positions()).indexed(vec![0, 1, 2, 0, 2, 3]);

        assert_eq!(geometry.vertex_count(), 4);
        assert_eq!(geometry.triangle_estimate(), 2.0);
    }

    #[test]
    fn test_non_indexed_fallback() {
        let geometry = Geometry::with_positions(quad_positions());

        // 4 / 3，不取整
        assert!((geometry.triangle_estimate() - 4.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_index_without_positions_contributes_nothing() {
        let geometry = Geometry {
            indices: Some(vec![0, 1, 2]),
            ..Geometry::default()
        };

        assert_eq!(geometry.vertex_count(), 0);
        assert_eq!(geometry.triangle_estimate(), 0.0);
    }

    #[test]
    fn test_validation() {
        let valid = Geometry::with_positions(quad_positions()).indexed(vec![0, 1, 2]);
        assert!(valid.validate().is_ok());

        let out_of_range = Geometry::with_positions(quad_positions()).indexed(vec![0, 1, 9]);
        let result = out_of_range.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("超出顶点范围"));

        let bad_normals =
            Geometry::with_positions(quad_positions()).with_normals(vec![[0.0, 1.0, 0.0]]);
        assert!(bad_normals.validate().is_err());
    }
}
