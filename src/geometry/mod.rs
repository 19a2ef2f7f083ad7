/// 几何体与场景模块
///
/// 提供场景树、几何体、材质数据结构，包围盒计算，以及各格式的模型加载器。
///
/// # 模块结构
///
/// - `mesh`: 几何体缓冲区（位置、法线、UV、索引）
/// - `material`: 材质和贴图，按引用身份共享
/// - `node`: 场景节点所有权树
/// - `bounds`: 世界空间包围盒
/// - `loaders`: 各种格式的模型加载器和加载流程
///
/// # 架构设计
///
/// ```text
/// 文件 (GLB/glTF/OBJ/FBX)
///     ↓
/// ModelLoader (按扩展名分派)
///     ↓
/// GltfLoader / ObjLoader / FbxLoader
///     ↓
/// SceneNode (场景树)
///     ↓
/// 统计 / 评分 / 取景
/// ```
///
/// # 使用示例
///
/// ```rust,no_run
/// use model_viewer::geometry::compute_bounds;
/// use model_viewer::geometry::loaders::{ModelDecoder, ObjLoader};
///
/// let root = ObjLoader.decode(&std::fs::read("model.obj")?)?;
/// let bounds = compute_bounds(&root);
///
/// println!("尺寸: {:?}", bounds.size);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```

pub mod mesh;
pub mod material;
pub mod node;
pub mod bounds;
pub mod loaders;

// 重新导出常用类型
pub use mesh::Geometry;
pub use material::{ImageInfo, Material, MaterialRef, Texture};
pub use node::{Mesh, NodeKind, SceneNode};
pub use bounds::{compute_aabb, compute_bounds, Aabb, Bounds};
