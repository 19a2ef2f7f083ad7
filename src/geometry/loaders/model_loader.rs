//! 模型加载与分派
//!
//! 根据扩展名选择解码器，驱动异步传输与解码并报告进度，
//! 成功后计算统计信息。加载器不持有跨调用的可变状态，每次调用相互独立。

use std::sync::Arc;

use super::stream::{ModelFile, ReleaseHook, StreamHandle, TransferEvent};
use super::{file_extension, DecoderRegistry, ModelDecoder, ModelFormat};
use crate::analysis::performance::{PerformanceReport, PerformanceScorer};
use crate::analysis::stats::{compute_model_stats, ModelStatistics};
use crate::core::config::LoaderConfig;
use crate::core::error::{DecodeError, LoadError};
use crate::geometry::node::SceneNode;

/// 加载成功后根节点的名称
pub const MODEL_ROOT_NAME: &str = "Model";

/// 加载结果
#[derive(Debug, Clone)]
pub struct LoadedModel {
    /// 场景根节点，名称为 `"Model"`
    pub model: SceneNode,
    pub stats: ModelStatistics,
    pub format: ModelFormat,
    /// 原始文件大小（字节）
    pub file_size: u64,
}

impl LoadedModel {
    /// 用给定评分器计算性能报告
    pub fn performance(&self, scorer: &PerformanceScorer) -> PerformanceReport {
        scorer.score(&self.stats, self.file_size)
    }
}

/// 进度报告器
///
/// 保证报告值在 [0, 100] 内且单调不减。
struct ProgressReporter<F: FnMut(f32)> {
    callback: F,
    last: f32,
    indeterminate: f32,
}

impl<F: FnMut(f32)> ProgressReporter<F> {
    fn new(callback: F, indeterminate: f32) -> Self {
        Self {
            callback,
            last: 0.0,
            indeterminate,
        }
    }

    /// 总长度已知时报告百分比，否则报告固定的中间值
    fn on_transfer(&mut self, event: TransferEvent) {
        let value = match event.total {
            Some(total) if total > 0 => event.loaded as f32 / total as f32 * 100.0,
            _ => self.indeterminate,
        };
        self.report(value);
    }

    fn report(&mut self, value: f32) {
        let value = value.clamp(0.0, 100.0).max(self.last);
        self.last = value;
        (self.callback)(value);
    }
}

/// 模型加载器
#[derive(Clone, Default)]
pub struct ModelLoader {
    registry: DecoderRegistry,
    config: LoaderConfig,
    release_hook: Option<ReleaseHook>,
}

impl ModelLoader {
    /// 使用内置解码器和给定配置创建加载器
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// 替换解码器注册表
    pub fn with_registry(mut self, registry: DecoderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// 设置字节流句柄释放时的回调
    pub fn with_release_hook(mut self, hook: ReleaseHook) -> Self {
        self.release_hook = Some(hook);
        self
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// 选择文件对应的格式和解码器
    ///
    /// 扩展名不受支持时立即失败，不获取任何资源。
    fn resolve(&self, file: &ModelFile) -> Result<(ModelFormat, Arc<dyn ModelDecoder>), LoadError> {
        let extension = file_extension(file.name());
        let unsupported = || LoadError::UnsupportedFormat {
            extension: extension.clone(),
        };

        let format = ModelFormat::from_extension(&extension).ok_or_else(unsupported)?;
        let decoder = self.registry.get(format).cloned().ok_or_else(unsupported)?;
        Ok((format, decoder))
    }

    /// 加载模型
    ///
    /// `on_progress` 接收 [0, 100] 内单调不减的进度值，成功时最后一次为 100。
    /// 不支持的扩展名在调用任何解码器和进度回调之前失败。
    pub async fn load<F>(&self, file: ModelFile, on_progress: F) -> Result<LoadedModel, LoadError>
    where
        F: FnMut(f32),
    {
        let (format, decoder) = self.resolve(&file).inspect_err(|e| {
            tracing::warn!(file = %file.name(), error = %e, "Rejected model upload");
        })?;

        tracing::info!(
            file = %file.name(),
            format = %format,
            size = file.size(),
            "Loading model"
        );

        let mut progress = ProgressReporter::new(on_progress, self.config.indeterminate_progress);

        let decoded = {
            let handle = StreamHandle::open(&file, self.release_hook.clone());
            let transfer = handle
                .read_to_end(self.config.chunk_size, |event| progress.on_transfer(event))
                .await;
            transfer
                .map_err(DecodeError::from)
                .and_then(|bytes| decoder.decode(&bytes))
        };

        let mut model = decoded.map_err(|e| {
            tracing::error!(file = %file.name(), format = %format, error = %e, "Failed to decode model");
            LoadError::DecodeFailure { format }
        })?;

        model.name = MODEL_ROOT_NAME.to_string();
        progress.report(100.0);

        let stats = compute_model_stats(&model);
        tracing::info!(
            vertices = stats.vertex_count,
            triangles = stats.triangle_count,
            meshes = stats.mesh_count,
            materials = stats.material_count,
            "Model loaded"
        );

        Ok(LoadedModel {
            model,
            stats,
            format,
            file_size: file.size(),
        })
    }
}

impl std::fmt::Debug for ModelLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelLoader")
            .field("registry", &self.registry)
            .field("config", &self.config)
            .field("release_hook", &self.release_hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::material::Material;
    use crate::geometry::mesh::Geometry;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 记录调用次数的解码器，返回一个固定的三角形
    struct CountingDecoder {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl ModelDecoder for CountingDecoder {
        fn decode(&self, _bytes: &[u8]) -> Result<SceneNode, DecodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DecodeError::Parse("corrupt".to_string()));
            }
            Ok(SceneNode::group("Scene").with_child(SceneNode::mesh(
                "Triangle",
                Geometry::with_positions(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]),
                vec![Material::new("Default").shared()],
            )))
        }

        fn supported_extensions(&self) -> &'static [&'static str] {
            &["glb", "gltf", "obj", "fbx"]
        }
    }

    struct Harness {
        loader: ModelLoader,
        calls: Arc<AtomicUsize>,
        releases: Arc<AtomicUsize>,
    }

    fn harness(fail: bool, chunk_size: usize) -> Harness {
        let calls = Arc::new(AtomicUsize::new(0));
        let releases = Arc::new(AtomicUsize::new(0));
        let mut registry = DecoderRegistry::empty();
        registry.register(Arc::new(CountingDecoder {
            calls: Arc::clone(&calls),
            fail,
        }));
        let counter = Arc::clone(&releases);
        let loader = ModelLoader::new(LoaderConfig {
            chunk_size,
            ..LoaderConfig::default()
        })
        .with_registry(registry)
        .with_release_hook(Arc::new(move |_url: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        Harness {
            loader,
            calls,
            releases,
        }
    }

    #[test]
    fn test_unsupported_extension_fails_fast() {
        let h = harness(false, 4);
        let mut progress = Vec::new();

        let result = pollster::block_on(
            h.loader
                .load(ModelFile::new("part.STL", vec![0u8; 16]), |p| progress.push(p)),
        );

        assert_eq!(
            result.unwrap_err(),
            LoadError::UnsupportedFormat {
                extension: "stl".to_string()
            }
        );
        assert!(progress.is_empty());
        assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        assert_eq!(h.releases.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_successful_load() {
        let h = harness(false, 4);
        let mut progress = Vec::new();

        let loaded = pollster::block_on(
            h.loader
                .load(ModelFile::new("Robot.GLB", vec![0u8; 10]), |p| progress.push(p)),
        )
        .unwrap();

        assert_eq!(loaded.model.name, MODEL_ROOT_NAME);
        assert_eq!(loaded.format, ModelFormat::Glb);
        assert_eq!(loaded.file_size, 10);
        assert_eq!(loaded.stats.vertex_count, 3);
        assert_eq!(loaded.stats.triangle_count, 1);
        assert_eq!(loaded.stats.material_count, 1);

        assert_eq!(progress, vec![40.0, 80.0, 100.0, 100.0]);
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_length_reports_midpoint() {
        let h = harness(false, 4);
        let mut progress = Vec::new();

        pollster::block_on(
            h.loader
                .load(ModelFile::without_length("cube.obj", vec![0u8; 10]), |p| progress.push(p)),
        )
        .unwrap();

        assert_eq!(progress, vec![50.0, 50.0, 50.0, 100.0]);
    }

    #[test]
    fn test_decode_failure_releases_handle() {
        let h = harness(true, 1024);

        let result = pollster::block_on(h.loader.load(ModelFile::new("rig.fbx", vec![1u8; 8]), |_| {}));

        assert_eq!(
            result.unwrap_err(),
            LoadError::DecodeFailure {
                format: ModelFormat::Fbx
            }
        );
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_calls_are_independent() {
        let h = harness(false, 1024);

        let first = pollster::block_on(h.loader.load(ModelFile::new("a.obj", vec![0u8; 3]), |_| {})).unwrap();
        let second = pollster::block_on(h.loader.load(ModelFile::new("b.gltf", vec![0u8; 5]), |_| {})).unwrap();

        assert_eq!(first.stats, second.stats);
        assert_eq!(second.format, ModelFormat::Gltf);
        assert_eq!(h.releases.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_decoder_is_unsupported() {
        let loader = ModelLoader::default().with_registry(DecoderRegistry::empty());
        let result = pollster::block_on(loader.load(ModelFile::new("a.obj", vec![0u8; 3]), |_| {}));

        assert!(matches!(result, Err(LoadError::UnsupportedFormat { .. })));
    }

    #[test]
    fn test_loads_real_obj_with_default_registry() {
        let obj = "o Quad\nv 0 0 0\nv 2 0 0\nv 2 1 0\nv 0 1 0\nf 1 2 3 4\n";
        let loader = ModelLoader::default();

        let loaded = pollster::block_on(loader.load(ModelFile::new("QUAD.OBJ", obj.as_bytes().to_vec()), |_| {}))
            .unwrap();

        assert_eq!(loaded.stats.mesh_count, 1);
        assert_eq!(loaded.stats.vertex_count, 4);
        assert_eq!(loaded.stats.triangle_count, 2);
        assert_eq!((loaded.stats.width, loaded.stats.height, loaded.stats.depth), (2.0, 1.0, 0.0));

        let report = loaded.performance(&PerformanceScorer::default());
        assert_eq!(report.score, 100);
    }
}
