/// FBX 文件加载器
///
/// 使用 asset-importer (Assimp) 从内存导入 Autodesk FBX 格式的3D模型，
/// 再把导入的场景转换为查看器的场景树。
///
/// # 特性
///
/// - 支持二进制和 ASCII FBX（FBX 2011 及以上版本）
/// - 递归遍历场景层次，保留节点局部变换
/// - 自动三角化（通过 Assimp 后处理）
/// - 同一索引的材质在网格之间共享
/// - 漫反射/基础色贴图和法线/凹凸贴图，内嵌贴图解码后得到尺寸
use std::collections::HashMap;
use std::path::Path;

use asset_importer::postprocess::PostProcessSteps;
use asset_importer::{Importer, Scene, TextureType};
use image::GenericImageView;

use super::ModelDecoder;
use crate::core::error::DecodeError;
use crate::core::math::Matrix4;
use crate::geometry::material::{ImageInfo, Material, MaterialRef, Texture};
use crate::geometry::mesh::Geometry;
use crate::geometry::node::SceneNode;

/// 二进制 FBX 文件头魔数
const BINARY_MAGIC: &[u8] = b"Kaydara FBX Binary";

/// ASCII FBX 中必然出现的顶层节点
const ASCII_MARKER: &[u8] = b"FBXHeaderExtension";

/// FBX 格式加载器
pub struct FbxLoader;

impl ModelDecoder for FbxLoader {
    fn decode(&self, bytes: &[u8]) -> Result<SceneNode, DecodeError> {
        // Assimp 在提示失效时会尝试其他格式，先确认内容确实是 FBX
        if !looks_like_fbx(bytes) {
            return Err(DecodeError::Parse("文件头无效：不是 FBX 文件".to_string()));
        }

        let scene = Importer::new()
            .read_from_memory(bytes)
            .with_post_process(PostProcessSteps::TRIANGULATE | PostProcessSteps::SORT_BY_PTYPE)
            .import_from_memory(bytes, Some("fbx"))
            .map_err(|e| DecodeError::ExternalLibrary(format!("Assimp 导入 FBX 失败: {}", e)))?;

        let root = scene
            .root_node()
            .ok_or_else(|| DecodeError::Parse("FBX 场景没有根节点".to_string()))?;

        let mut context = ImportContext::new(&scene);
        let converted = context.node(&root)?;

        tracing::debug!(
            meshes = scene.num_meshes(),
            materials = context.materials.len(),
            textures = scene.num_textures(),
            "成功导入 FBX"
        );

        Ok(converted)
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["fbx"]
    }
}

/// 判断内容是否为 FBX（二进制魔数，或 ASCII 文件头节点）
fn looks_like_fbx(bytes: &[u8]) -> bool {
    if bytes.starts_with(BINARY_MAGIC) {
        return true;
    }
    // ASCII 文件头节点总在开头附近
    let head = &bytes[..bytes.len().min(4096)];
    head.windows(ASCII_MARKER.len()).any(|window| window == ASCII_MARKER)
}

/// 单次导入的上下文
struct ImportContext<'a> {
    scene: &'a Scene,
    /// Assimp 材质索引 -> 共享材质
    materials: HashMap<usize, MaterialRef>,
}

impl<'a> ImportContext<'a> {
    fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            materials: HashMap::new(),
        }
    }

    /// 获取（必要时创建）指定索引的材质
    fn material(&mut self, index: usize) -> MaterialRef {
        if let Some(existing) = self.materials.get(&index) {
            return existing.clone();
        }

        let converted = match self.scene.material(index) {
            Some(source) => {
                let mut material = Material::new(source.name());
                material.base_color_map = [TextureType::BaseColor, TextureType::Diffuse]
                    .into_iter()
                    .find_map(|kind| source.texture(kind, 0))
                    .map(|info| self.texture(&info.path));
                material.normal_map = [TextureType::Normals, TextureType::NormalCamera, TextureType::Height]
                    .into_iter()
                    .find_map(|kind| source.texture(kind, 0))
                    .map(|info| self.texture(&info.path));
                material
            }
            None => Material::new("Default"),
        };

        let shared = converted.shared();
        self.materials.insert(index, shared.clone());
        shared
    }

    /// 解析贴图路径：`*N` 指向第 N 张内嵌贴图，其余按文件名匹配内嵌贴图
    fn texture(&self, path: &str) -> Texture {
        let embedded = match path.strip_prefix('*') {
            Some(index) => index.parse().ok().and_then(|index| self.scene.texture(index)),
            None => self.scene.find_texture_by_filename(path),
        };

        let name = Path::new(path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .filter(|stem| !stem.is_empty())
            .unwrap_or(path)
            .to_string();

        let image = embedded.and_then(|texture| {
            if texture.is_compressed() {
                match texture.data() {
                    Ok(asset_importer::TextureData::Compressed(bytes)) => compressed_image_info(&bytes),
                    _ => None,
                }
            } else {
                Some(ImageInfo::new(texture.width(), texture.height()))
            }
        });

        Texture {
            name: Some(name),
            image,
        }
    }

    fn geometry(&self, mesh: &asset_importer::mesh::Mesh) -> Result<Geometry, DecodeError> {
        let positions = mesh.vertices().iter().map(|v| [v.x, v.y, v.z]).collect();
        let mut geometry = Geometry::with_positions(positions);

        if let Some(normals) = mesh.normals() {
            geometry = geometry.with_normals(normals.iter().map(|n| [n.x, n.y, n.z]).collect());
        }
        if let Some(uvs) = mesh.texture_coords(0) {
            geometry = geometry.with_uvs(uvs.iter().map(|uv| [uv.x, uv.y]).collect());
        }

        // 三角化后只保留三角形面，点和线不参与统计
        let indices = mesh
            .faces()
            .filter(|face| face.num_indices() == 3)
            .flat_map(|face| face.indices().to_vec())
            .collect();
        geometry = geometry.indexed(indices);

        geometry.validate().map_err(DecodeError::InvalidGeometry)?;
        Ok(geometry)
    }

    fn mesh_node(&mut self, name: String, index: usize) -> Result<SceneNode, DecodeError> {
        let mesh = self
            .scene
            .mesh(index)
            .ok_or_else(|| DecodeError::Parse(format!("网格索引 {} 超出范围", index)))?;
        let geometry = self
            .geometry(&mesh)
            .map_err(|e| DecodeError::InvalidGeometry(format!("{}: {}", name, e)))?;
        let material = self.material(mesh.material_index());
        Ok(SceneNode::mesh(name, geometry, vec![material]))
    }

    /// 递归转换节点
    ///
    /// 只有一个网格的节点直接成为网格节点，多个网格时每个网格是一个子节点。
    fn node(&mut self, node: &asset_importer::node::Node) -> Result<SceneNode, DecodeError> {
        let name = node.name();
        let mesh_indices: Vec<usize> = node.mesh_indices().collect();

        let mut converted = match mesh_indices.as_slice() {
            [] => SceneNode::group(name),
            [index] => self.mesh_node(name, *index)?,
            indices => {
                let mut group = SceneNode::group(name);
                for &index in indices {
                    let child_name = self
                        .scene
                        .mesh(index)
                        .map(|mesh| mesh.name())
                        .filter(|mesh_name| !mesh_name.is_empty())
                        .unwrap_or_else(|| format!("Mesh_{}", index));
                    group.add_child(self.mesh_node(child_name, index)?);
                }
                group
            }
        };

        converted.transform = Matrix4::from_column_slice(&node.transformation().to_cols_array());
        for child in node.children() {
            converted.add_child(self.node(&child)?);
        }
        Ok(converted)
    }
}

/// 解码压缩格式（PNG、JPEG 等）的内嵌贴图，只保留尺寸
fn compressed_image_info(bytes: &[u8]) -> Option<ImageInfo> {
    match image::load_from_memory(bytes) {
        Ok(image) => {
            let (width, height) = image.dimensions();
            Some(ImageInfo::new(width, height))
        }
        Err(e) => {
            tracing::debug!("FBX 内嵌贴图解码失败: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::census::census;
    use crate::geometry::bounds::compute_bounds;
    use approx::assert_relative_eq;

    /// 2x1 的四边形，挂在平移 (1, 0, 0) 的模型上，绑定一个材质
    const QUAD_FBX: &str = r#"; FBX 7.4.0 project file
FBXHeaderExtension:  {
	FBXHeaderVersion: 1003
	FBXVersion: 7400
}
GlobalSettings:  {
	Version: 1000
	Properties70:  {
		P: "UnitScaleFactor", "double", "Number", "",1
	}
}
Objects:  {
	Geometry: 100, "Geometry::Quad", "Mesh" {
		Vertices: *12 {
			a: 0,0,0,2,0,0,2,1,0,0,1,0
		}
		PolygonVertexIndex: *4 {
			a: 0,1,2,-4
		}
		GeometryVersion: 124
		LayerElementMaterial: 0 {
			Version: 101
			Name: ""
			MappingInformationType: "AllSame"
			ReferenceInformationType: "IndexToDirect"
			Materials: *1 {
				a: 0
			}
		}
		Layer: 0 {
			Version: 100
			LayerElement:  {
				Type: "LayerElementMaterial"
				TypedIndex: 0
			}
		}
	}
	Model: 200, "Model::Quad", "Mesh" {
		Version: 232
		Properties70:  {
			P: "Lcl Translation", "Lcl Translation", "", "A",1,0,0
		}
	}
	Material: 300, "Material::Paint", "" {
		Version: 102
		ShadingModel: "phong"
		MultiLayer: 0
		Properties70:  {
			P: "DiffuseColor", "Color", "", "A",0.8,0.8,0.8
		}
	}
}
Connections:  {
	C: "OO",200,0
	C: "OO",100,200
	C: "OO",300,200
}
"#;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut png = Vec::new();
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(width, height))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageOutputFormat::Png)
            .unwrap();
        png
    }

    #[test]
    fn test_decode_ascii_quad() {
        let root = FbxLoader.decode(QUAD_FBX.as_bytes()).unwrap();

        let result = census(&root);
        assert_eq!(result.meshes, 1);
        assert_eq!(result.vertices, 4);
        assert_eq!(result.triangles, 2);
        assert_eq!(result.material_count, 1);
        assert_eq!(result.texture_memory_bytes, 0);

        let mut material_names = Vec::new();
        root.traverse(&mut |node| {
            if let Some(mesh) = node.as_mesh() {
                material_names.extend(mesh.materials.iter().map(|m| m.name.clone()));
            }
        });
        assert_eq!(material_names, vec!["Paint".to_string()]);
    }

    #[test]
    fn test_node_transform_applied_to_bounds() {
        let root = FbxLoader.decode(QUAD_FBX.as_bytes()).unwrap();
        let bounds = compute_bounds(&root);

        assert_relative_eq!(bounds.center.x, 2.0, epsilon = 1e-4);
        assert_relative_eq!(bounds.size.x, 2.0, epsilon = 1e-4);
        assert_relative_eq!(bounds.size.y, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_non_fbx_content_fails() {
        assert!(matches!(FbxLoader.decode(b""), Err(DecodeError::Parse(_))));
        assert!(matches!(
            FbxLoader.decode(b"v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n"),
            Err(DecodeError::Parse(_))
        ));
    }

    #[test]
    fn test_truncated_binary_fails() {
        let mut bytes = b"Kaydara FBX Binary  \0\x1a\0".to_vec();
        bytes.extend_from_slice(&7400u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 6]);

        assert!(FbxLoader.decode(&bytes).is_err());
    }

    #[test]
    fn test_oversized_array_length_returns_error() {
        // 一个节点 "A"，带一个声明 u32::MAX 个元素、zlib 编码、载荷为空的 double 数组
        let mut bytes = b"Kaydara FBX Binary  \0\x1a\0".to_vec();
        bytes.extend_from_slice(&7400u32.to_le_bytes());
        let record_end = (bytes.len() + 12 + 2 + 13) as u32;
        bytes.extend_from_slice(&record_end.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&13u32.to_le_bytes());
        bytes.extend_from_slice(&[1, b'A', b'd']);
        bytes.extend_from_slice(&u32::MAX.to_le_bytes());
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());

        assert!(FbxLoader.decode(&bytes).is_err());
    }

    #[test]
    fn test_compressed_image_info() {
        assert_eq!(compressed_image_info(&png_bytes(4, 2)), Some(ImageInfo::new(4, 2)));
        assert_eq!(compressed_image_info(b"not an image"), None);
    }

    #[test]
    fn test_looks_like_fbx() {
        assert!(looks_like_fbx(b"Kaydara FBX Binary  \0\x1a\0"));
        assert!(looks_like_fbx(QUAD_FBX.as_bytes()));
        assert!(!looks_like_fbx(b"glTF"));
    }
}
