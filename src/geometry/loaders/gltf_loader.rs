/// glTF / GLB 加载器
///
/// 使用 gltf crate 从内存导入 glTF 2.0 资源。二进制 GLB 和内嵌 data URI 的
/// JSON glTF 都可以直接导入；引用外部 `.bin` 或图片文件的 glTF 无法解析，
/// 因为上传的只有单个文件。
use std::collections::HashMap;

use super::ModelDecoder;
use crate::core::error::DecodeError;
use crate::core::math::Matrix4;
use crate::geometry::material::{ImageInfo, Material, MaterialRef, Texture};
use crate::geometry::mesh::Geometry;
use crate::geometry::node::SceneNode;

/// glTF 格式加载器
///
/// # 场景结构
///
/// - 每个 glTF 节点对应一个场景节点，保留其局部变换
/// - 只有一个图元的网格直接挂在节点上，多个图元时每个图元是一个子节点
/// - 同一索引的材质在整个文件中共享，没有材质的图元共享一个默认材质
pub struct GltfLoader;

/// 单次导入的上下文
struct ImportContext<'a> {
    buffers: &'a [gltf::buffer::Data],
    images: &'a [gltf::image::Data],
    materials: HashMap<usize, MaterialRef>,
    default_material: Option<MaterialRef>,
}

impl<'a> ImportContext<'a> {
    fn new(buffers: &'a [gltf::buffer::Data], images: &'a [gltf::image::Data]) -> Self {
        Self {
            buffers,
            images,
            materials: HashMap::new(),
            default_material: None,
        }
    }

    fn texture(&self, texture: gltf::Texture<'_>) -> Texture {
        let source = texture.source();
        let name = texture
            .name()
            .or_else(|| source.name())
            .map(str::to_string);

        Texture {
            name,
            image: self
                .images
                .get(source.index())
                .map(|data| ImageInfo::new(data.width, data.height)),
        }
    }

    /// 获取（必要时创建）图元使用的材质
    fn material(&mut self, material: gltf::Material<'_>) -> MaterialRef {
        let Some(index) = material.index() else {
            return self
                .default_material
                .get_or_insert_with(|| Material::new("Default").shared())
                .clone();
        };

        if let Some(existing) = self.materials.get(&index) {
            return existing.clone();
        }

        let mut converted = Material::new(material.name().unwrap_or_default());
        if let Some(info) = material.pbr_metallic_roughness().base_color_texture() {
            converted.base_color_map = Some(self.texture(info.texture()));
        }
        if let Some(normal) = material.normal_texture() {
            converted.normal_map = Some(self.texture(normal.texture()));
        }

        let shared = converted.shared();
        self.materials.insert(index, shared.clone());
        shared
    }

    fn geometry(&self, primitive: &gltf::Primitive<'_>) -> Result<Geometry, DecodeError> {
        let reader = primitive.reader(|buffer| self.buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let mut geometry = Geometry::new();
        geometry.positions = reader.read_positions().map(|positions| positions.collect());
        geometry.normals = reader.read_normals().map(|normals| normals.collect());
        geometry.uvs = reader.read_tex_coords(0).map(|uvs| uvs.into_f32().collect());
        geometry.indices = reader.read_indices().map(|indices| indices.into_u32().collect());

        geometry.validate().map_err(DecodeError::InvalidGeometry)?;
        Ok(geometry)
    }

    fn mesh_node(&mut self, name: String, primitive: gltf::Primitive<'_>) -> Result<SceneNode, DecodeError> {
        let geometry = self.geometry(&primitive)?;
        let material = self.material(primitive.material());
        Ok(SceneNode::mesh(name, geometry, vec![material]))
    }

    /// 递归转换节点
    fn node(&mut self, node: gltf::Node<'_>) -> Result<SceneNode, DecodeError> {
        let name = node
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Node_{}", node.index()));
        let columns = node.transform().matrix();
        let transform = Matrix4::from_fn(|row, column| columns[column][row]);

        let mut converted = match node.mesh() {
            Some(mesh) => {
                let mut primitives: Vec<_> = mesh.primitives().collect();
                if primitives.len() == 1 {
                    let primitive = primitives.remove(0);
                    self.mesh_node(name, primitive)?
                } else {
                    let mut group = SceneNode::group(name);
                    for primitive in primitives {
                        let child_name = format!("{}_{}", mesh.name().unwrap_or("Primitive"), primitive.index());
                        group.add_child(self.mesh_node(child_name, primitive)?);
                    }
                    group
                }
            }
            None => SceneNode::group(name),
        };

        converted.transform = transform;
        for child in node.children() {
            converted.add_child(self.node(child)?);
        }
        Ok(converted)
    }
}

impl ModelDecoder for GltfLoader {
    fn decode(&self, bytes: &[u8]) -> Result<SceneNode, DecodeError> {
        let (document, buffers, images) =
            gltf::import_slice(bytes).map_err(|e| DecodeError::ExternalLibrary(format!("gltf 导入失败: {}", e)))?;

        let mut context = ImportContext::new(&buffers, &images);

        let scene = document.default_scene().or_else(|| document.scenes().next());
        let mut root = SceneNode::group(
            scene
                .as_ref()
                .and_then(|scene| scene.name())
                .unwrap_or("Scene"),
        );

        if let Some(scene) = scene {
            for node in scene.nodes() {
                root.add_child(context.node(node)?);
            }
        } else {
            tracing::warn!("glTF 文件不包含场景");
        }

        tracing::debug!(
            "成功导入 glTF: {} 个节点, {} 个材质, {} 张图片",
            root.node_count(),
            context.materials.len(),
            images.len()
        );

        Ok(root)
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["glb", "gltf"]
    }
}
