/// 模型加载器模块
///
/// 提供统一的解码接口、按扩展名分派的注册表以及异步加载流程。
///
/// # 支持的格式
///
/// - **GLB / glTF**: 使用 gltf crate（仅支持内嵌资源）
/// - **OBJ**: Wavefront OBJ 格式（使用 tobj crate）
/// - **FBX**: Autodesk FBX 格式（使用 asset-importer / Assimp）
///
/// # 使用示例
///
/// ```rust,no_run
/// use model_viewer::geometry::loaders::{ModelFile, ModelLoader};
///
/// let file = ModelFile::new("helmet.glb", std::fs::read("helmet.glb")?);
/// let loaded = pollster::block_on(ModelLoader::default().load(file, |p| println!("{:.0}%", p)))?;
/// println!("三角形数: {}", loaded.stats.triangle_count);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::core::error::DecodeError;
use crate::geometry::node::SceneNode;

pub mod stream;
pub mod model_loader;
pub mod gltf_loader;
pub mod obj_loader;
pub mod fbx_loader;

// 重新导出加载器
pub use stream::{ModelFile, StreamHandle, TransferEvent};
pub use model_loader::{LoadedModel, ModelLoader};
pub use gltf_loader::GltfLoader;
pub use obj_loader::ObjLoader;
pub use fbx_loader::FbxLoader;

/// 支持的模型格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum ModelFormat {
    Glb,
    Gltf,
    Obj,
    Fbx,
}

impl ModelFormat {
    /// 所有支持的格式
    pub const ALL: [ModelFormat; 4] = [
        ModelFormat::Glb,
        ModelFormat::Gltf,
        ModelFormat::Obj,
        ModelFormat::Fbx,
    ];

    /// 根据扩展名（不含点号，大小写不敏感）识别格式
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "glb" => Some(ModelFormat::Glb),
            "gltf" => Some(ModelFormat::Gltf),
            "obj" => Some(ModelFormat::Obj),
            "fbx" => Some(ModelFormat::Fbx),
            _ => None,
        }
    }

    /// 小写扩展名
    pub fn extension(&self) -> &'static str {
        match self {
            ModelFormat::Glb => "glb",
            ModelFormat::Gltf => "gltf",
            ModelFormat::Obj => "obj",
            ModelFormat::Fbx => "fbx",
        }
    }

    /// 面向用户的格式名称（glb 与 gltf 共用一个名称）
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelFormat::Glb | ModelFormat::Gltf => "GLTF/GLB",
            ModelFormat::Obj => "OBJ",
            ModelFormat::Fbx => "FBX",
        }
    }
}

impl fmt::Display for ModelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 取文件名最后一个点号之后的部分作为扩展名（小写）
///
/// 没有点号时返回整个文件名，与浏览器端 `name.split('.').pop()` 一致。
pub fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit('.')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
}

/// 模型解码器 trait
///
/// 解码器只负责把完整的字节内容转换为场景树；传输、进度和统计由
/// `ModelLoader` 负责。解码器是无状态的，可以被多次并发调用。
///
/// # 实现要求
///
/// - 每次调用要么返回场景根节点，要么返回错误，二者恰好其一
/// - 不持有跨调用的可变状态
pub trait ModelDecoder: Send + Sync {
    /// 解码完整的文件内容
    fn decode(&self, bytes: &[u8]) -> Result<SceneNode, DecodeError>;

    /// 支持的文件扩展名列表（小写，不含点号）
    fn supported_extensions(&self) -> &'static [&'static str];
}

/// 按格式分派解码器的注册表
///
/// 每种格式恰好对应一个解码器。
#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<ModelFormat, Arc<dyn ModelDecoder>>,
}

impl DecoderRegistry {
    /// 创建空注册表
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// 注册解码器，覆盖其 `supported_extensions` 中列出的全部格式
    pub fn register(&mut self, decoder: Arc<dyn ModelDecoder>) {
        for extension in decoder.supported_extensions() {
            if let Some(format) = ModelFormat::from_extension(extension) {
                self.decoders.insert(format, Arc::clone(&decoder));
            }
        }
    }

    /// 为单个格式注册解码器
    pub fn register_for(&mut self, format: ModelFormat, decoder: Arc<dyn ModelDecoder>) {
        self.decoders.insert(format, decoder);
    }

    /// 查找格式对应的解码器
    pub fn get(&self, format: ModelFormat) -> Option<&Arc<dyn ModelDecoder>> {
        self.decoders.get(&format)
    }
}

impl Default for DecoderRegistry {
    /// 内置的 glTF/GLB、OBJ、FBX 解码器
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(GltfLoader));
        registry.register(Arc::new(ObjLoader));
        registry.register(Arc::new(FbxLoader));
        registry
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<_> = self.decoders.keys().map(|format| format.extension()).collect();
        formats.sort_unstable();
        f.debug_struct("DecoderRegistry").field("formats", &formats).finish()
    }
}
