/// OBJ 文件加载器
///
/// 使用 tobj crate 从内存解析 Wavefront OBJ 格式的3D模型。
/// 每个对象（以及对象内每个 `usemtl` 分段）生成一个网格节点。
use std::io::{BufReader, Cursor};
use std::sync::Arc;

use super::ModelDecoder;
use crate::core::error::DecodeError;
use crate::geometry::material::{Material, MaterialRef};
use crate::geometry::mesh::Geometry;
use crate::geometry::node::SceneNode;

/// OBJ 格式加载器
///
/// 实现 `ModelDecoder` trait。
///
/// # 特性
///
/// - 自动三角化，统一为单一索引
/// - 保留索引、法线和纹理坐标（如果存在）
/// - 上传的是单个文件，`mtllib` 引用的材质库无法解析，
///   此时每个网格使用一个独立的默认材质
pub struct ObjLoader;

impl ObjLoader {
    fn load_options() -> tobj::LoadOptions {
        tobj::LoadOptions {
            triangulate: true,  // 自动三角化
            single_index: true, // 使用单一索引
            ..Default::default()
        }
    }

    /// 把 tobj 网格转换为几何体
    fn convert_mesh(name: &str, mesh: &tobj::Mesh) -> Result<Geometry, DecodeError> {
        if mesh.positions.len() % 3 != 0 {
            return Err(DecodeError::InvalidGeometry(format!(
                "{}: 顶点位置数据不完整: {} 个浮点数",
                name,
                mesh.positions.len()
            )));
        }

        let positions: Vec<[f32; 3]> = mesh
            .positions
            .chunks_exact(3)
            .map(|p| [p[0], p[1], p[2]])
            .collect();
        let vertex_count = positions.len();

        let mut geometry = Geometry::with_positions(positions).indexed(mesh.indices.clone());

        if !mesh.normals.is_empty() && mesh.normals.len() == vertex_count * 3 {
            geometry = geometry.with_normals(
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| [n[0], n[1], n[2]])
                    .collect(),
            );
        }

        if !mesh.texcoords.is_empty() && mesh.texcoords.len() == vertex_count * 2 {
            geometry = geometry.with_uvs(
                mesh.texcoords
                    .chunks_exact(2)
                    .map(|t| [t[0], t[1]])
                    .collect(),
            );
        }

        geometry
            .validate()
            .map_err(|e| DecodeError::InvalidGeometry(format!("{}: {}", name, e)))?;

        Ok(geometry)
    }
}

impl ModelDecoder for ObjLoader {
    fn decode(&self, bytes: &[u8]) -> Result<SceneNode, DecodeError> {
        let mut reader = BufReader::new(Cursor::new(bytes));

        let (models, materials) =
            tobj::load_obj_buf(&mut reader, &Self::load_options(), |_| Err(tobj::LoadError::OpenFileFailed))
                .map_err(|e| DecodeError::Parse(format!("tobj 解析失败: {}", e)))?;

        // 材质库加载失败不影响几何体
        let library: Vec<MaterialRef> = match materials {
            Ok(materials) => materials
                .into_iter()
                .map(|m| Material::new(m.name).shared())
                .collect(),
            Err(e) => {
                tracing::debug!("OBJ 材质库不可用: {}", e);
                Vec::new()
            }
        };

        let mut root = SceneNode::group("OBJ");

        for model in &models {
            let geometry = Self::convert_mesh(&model.name, &model.mesh)?;

            let material = model
                .mesh
                .material_id
                .and_then(|id| library.get(id))
                .map(Arc::clone)
                .unwrap_or_else(|| Material::new("Default").shared());

            root.add_child(SceneNode::mesh(model.name.clone(), geometry, vec![material]));
        }

        tracing::debug!("成功解析 OBJ 文件: {} 个网格", root.children.len());

        Ok(root)
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["obj"]
    }
}
