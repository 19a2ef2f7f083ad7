//! 上传文件与临时字节流句柄
//!
//! `StreamHandle` 是一次加载期间的临时资源，作用域结束时（Drop）释放，
//! 因此在成功、传输失败和解码失败的每条退出路径上都恰好释放一次。

use std::fmt;
use std::io;
use std::sync::Arc;

use futures::io::{AsyncReadExt, Cursor};

/// 句柄释放时的回调，参数为句柄的定位符
pub type ReleaseHook = Arc<dyn Fn(&str) + Send + Sync>;

/// 用户上传的模型文件
#[derive(Clone)]
pub struct ModelFile {
    name: String,
    bytes: Arc<[u8]>,
    length_computable: bool,
}

impl ModelFile {
    /// 创建总长度已知的文件
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
            length_computable: true,
        }
    }

    /// 创建传输时不暴露总长度的文件（进度只能报告中间值）
    pub fn without_length(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            length_computable: false,
            ..Self::new(name, bytes)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 原始文件大小（字节）
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn length_computable(&self) -> bool {
        self.length_computable
    }
}

impl fmt::Debug for ModelFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelFile")
            .field("name", &self.name)
            .field("size", &self.bytes.len())
            .field("length_computable", &self.length_computable)
            .finish()
    }
}

/// 一次传输进度事件
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferEvent {
    /// 已传输的字节数
    pub loaded: u64,
    /// 总字节数，未知时为 `None`
    pub total: Option<u64>,
}

impl TransferEvent {
    #[inline]
    pub fn length_computable(&self) -> bool {
        self.total.is_some()
    }
}

/// 临时字节流句柄
///
/// 由 `StreamHandle::open` 获取，离开作用域时释放并调用释放回调。
pub struct StreamHandle {
    url: String,
    bytes: Arc<[u8]>,
    length_computable: bool,
    release_hook: Option<ReleaseHook>,
}

impl StreamHandle {
    /// 为文件创建句柄
    pub fn open(file: &ModelFile, release_hook: Option<ReleaseHook>) -> Self {
        let url = format!("blob:model-viewer/{}", file.name);
        tracing::trace!(url = %url, "Stream handle acquired");
        Self {
            url,
            bytes: Arc::clone(&file.bytes),
            length_computable: file.length_computable,
            release_hook,
        }
    }

    /// 资源定位符
    pub fn url(&self) -> &str {
        &self.url
    }

    /// 分块读取全部内容，每读取一块报告一次进度事件
    pub async fn read_to_end<F>(&self, chunk_size: usize, mut on_event: F) -> io::Result<Vec<u8>>
    where
        F: FnMut(TransferEvent),
    {
        let total = self.length_computable.then_some(self.bytes.len() as u64);
        let mut reader = Cursor::new(Arc::clone(&self.bytes));
        let mut data = Vec::with_capacity(self.bytes.len());
        let mut chunk = vec![0u8; chunk_size.max(1)];

        loop {
            let read = reader.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            on_event(TransferEvent {
                loaded: data.len() as u64,
                total,
            });
        }

        Ok(data)
    }
}

impl Drop for StreamHandle {
    fn drop(&mut self) {
        tracing::trace!(url = %self.url, "Stream handle released");
        if let Some(hook) = self.release_hook.take() {
            hook(&self.url);
        }
    }
}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamHandle").field("url", &self.url).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_chunked_read_reports_progress() {
        let file = ModelFile::new("cube.obj", vec![7u8; 10]);
        let handle = StreamHandle::open(&file, None);

        let mut events = Vec::new();
        let data = pollster::block_on(handle.read_to_end(4, |event| events.push(event))).unwrap();

        assert_eq!(data, vec![7u8; 10]);
        let loaded: Vec<u64> = events.iter().map(|e| e.loaded).collect();
        assert_eq!(loaded, vec![4, 8, 10]);
        assert!(events.iter().all(|e| e.total == Some(10)));
    }

    #[test]
    fn test_unknown_length_events() {
        let file = ModelFile::without_length("cube.obj", vec![1u8; 3]);
        let handle = StreamHandle::open(&file, None);

        let mut events = Vec::new();
        pollster::block_on(handle.read_to_end(64, |event| events.push(event))).unwrap();

        assert_eq!(events.len(), 1);
        assert!(!events[0].length_computable());
    }

    #[test]
    fn test_release_hook_runs_once_on_drop() {
        let released = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&released);
        let hook: ReleaseHook = Arc::new(move |_url: &str| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let file = ModelFile::new("a.glb", Vec::<u8>::new());
        {
            let handle = StreamHandle::open(&file, Some(hook));
            assert_eq!(handle.url(), "blob:model-viewer/a.glb");
            assert_eq!(released.load(Ordering::SeqCst), 0);
        }
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_file_metadata() {
        let file = ModelFile::new("Robot.FBX", vec![0u8; 2048]);
        assert_eq!(file.name(), "Robot.FBX");
        assert_eq!(file.size(), 2048);
        assert!(file.length_computable());
    }
}
