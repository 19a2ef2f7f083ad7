//! 材质与贴图
//!
//! 材质通过 `Arc` 在网格之间共享，统计时按引用身份去重，而不是按字段比较：
//! 两个字段完全相同但分别创建的材质计为两个。

use std::sync::Arc;

/// 共享的材质引用
pub type MaterialRef = Arc<Material>;

/// 已解码贴图的尺寸信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

impl ImageInfo {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 以 RGBA8 估算的显存占用（字节）
    #[inline]
    pub fn rgba_bytes(&self) -> u64 {
        self.width as u64 * self.height as u64 * 4
    }
}

/// 材质上绑定的贴图
///
/// `image` 为 `None` 表示贴图存在但没有解码后的像素数据
/// （例如引用了未随文件上传的外部图片）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Texture {
    pub name: Option<String>,
    pub image: Option<ImageInfo>,
}

impl Texture {
    /// 创建带已解码图像的贴图
    pub fn decoded(width: u32, height: u32) -> Self {
        Self {
            name: None,
            image: Some(ImageInfo::new(width, height)),
        }
    }

    /// 创建没有像素数据的贴图
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            image: None,
        }
    }

    /// 估算显存占用，没有像素数据时为 0
    #[inline]
    pub fn memory_bytes(&self) -> u64 {
        self.image.map_or(0, |image| image.rgba_bytes())
    }
}

/// 材质
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub name: String,

    /// 基础色贴图
    pub base_color_map: Option<Texture>,

    /// 法线贴图
    pub normal_map: Option<Texture>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_base_color_map(mut self, texture: Texture) -> Self {
        self.base_color_map = Some(texture);
        self
    }

    pub fn with_normal_map(mut self, texture: Texture) -> Self {
        self.normal_map = Some(texture);
        self
    }

    /// 转为共享引用
    pub fn shared(self) -> MaterialRef {
        Arc::new(self)
    }

    /// 估算该材质绑定贴图的显存占用
    ///
    /// 只统计基础色贴图和法线贴图。
    pub fn texture_memory_bytes(&self) -> u64 {
        [&self.base_color_map, &self.normal_map]
            .into_iter()
            .flatten()
            .map(Texture::memory_bytes)
            .sum()
    }
}
