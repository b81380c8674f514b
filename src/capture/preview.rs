//! # 预览生成与登记模块
//!
//! ## 设计思路
//!
//! 预览句柄相当于浏览器里的临时对象 URL：每次采集都会分配一份，
//! 被替换或清空时必须释放，否则一次会话里反复选图会让资源无限增长。
//!
//! ## 实现思路
//!
//! 1. 只读 header 获取尺寸，按像素上限快速拒绝
//! 2. 完整解码（损坏文件在这里失败，不会进入检测）
//! 3. 按预览档位降采样（fast_image_resize，失败回退 image::resize_exact）
//! 4. 编码为 PNG，登记到 `PreviewRegistry`

use base64::{Engine as _, engine::general_purpose};
use bytes::Bytes;
use fast_image_resize as fr;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::source::PreviewHandle;
use super::{CaptureConfig, CaptureError, CaptureProvider};

/// 一份已编码的预览缩略图。
#[derive(Debug, Clone)]
pub struct PreviewImage {
    pub width: u32,
    pub height: u32,
    /// PNG 编码字节。
    pub png: Bytes,
}

impl PreviewImage {
    /// 渲染层可直接使用的 `data:image/png;base64,` 地址。
    pub fn data_url(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&self.png)
        )
    }
}

/// 预览资源登记表。
pub struct PreviewRegistry {
    next_id: AtomicU64,
    entries: Mutex<HashMap<PreviewHandle, Arc<PreviewImage>>>,
}

impl Default for PreviewRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub(super) fn allocate(&self, image: PreviewImage) -> Result<PreviewHandle, CaptureError> {
        let handle = PreviewHandle::from_id(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| CaptureError::ResourceLimit("预览登记表锁已中毒".to_string()))?;
        guard.insert(handle.clone(), Arc::new(image));
        Ok(handle)
    }

    /// 释放句柄；返回该句柄此前是否仍然存活。
    pub fn release(&self, handle: &PreviewHandle) -> Result<bool, CaptureError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| CaptureError::ResourceLimit("预览登记表锁已中毒".to_string()))?;
        Ok(guard.remove(handle).is_some())
    }

    pub fn get(&self, handle: &PreviewHandle) -> Result<Option<Arc<PreviewImage>>, CaptureError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| CaptureError::ResourceLimit("预览登记表锁已中毒".to_string()))?;
        Ok(guard.get(handle).cloned())
    }

    pub fn live_count(&self) -> Result<usize, CaptureError> {
        let guard = self
            .entries
            .lock()
            .map_err(|_| CaptureError::ResourceLimit("预览登记表锁已中毒".to_string()))?;
        Ok(guard.len())
    }
}

impl CaptureProvider {
    /// 仅通过图片头信息读取宽高。
    pub(super) fn inspect_dimensions_from_memory(bytes: &[u8]) -> Result<(u32, u32), CaptureError> {
        let reader = image::ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| CaptureError::InvalidFormat(format!("无法识别图片格式：{}", e)))?;

        reader
            .into_dimensions()
            .map_err(|e| CaptureError::Decode(format!("无法读取图片尺寸：{}", e)))
    }

    /// 校验像素数量是否超过配置上限。
    pub(super) fn validate_pixel_limits(
        config: &CaptureConfig,
        width: u32,
        height: u32,
    ) -> Result<(), CaptureError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| CaptureError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels == 0 {
            return Err(CaptureError::Decode("图片尺寸为 0".to_string()));
        }

        if pixels > config.max_decoded_pixels {
            return Err(CaptureError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, config.max_decoded_pixels
            )));
        }

        Ok(())
    }

    /// 完整解码并生成预览缩略图。
    pub(super) fn render_preview(
        bytes: &[u8],
        config: &CaptureConfig,
    ) -> Result<PreviewImage, CaptureError> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| CaptureError::Decode(format!("图片解码失败：{}", e)))?;

        let (raw_width, raw_height) = decoded.dimensions();
        Self::validate_pixel_limits(config, raw_width, raw_height)?;

        let preview = Self::downscale_for_preview(decoded, config);
        let (width, height) = preview.dimensions();

        let mut cursor = Cursor::new(Vec::new());
        preview
            .write_to(&mut cursor, ImageFormat::Png)
            .map_err(|e| CaptureError::Decode(format!("预览编码失败：{}", e)))?;

        Ok(PreviewImage {
            width,
            height,
            png: Bytes::from(cursor.into_inner()),
        })
    }

    fn downscale_for_preview(image: DynamicImage, config: &CaptureConfig) -> DynamicImage {
        let (width, height) = image.dimensions();
        let max_dimension = config.preview_max_dimension.max(1);

        if width <= max_dimension && height <= max_dimension {
            return image;
        }

        let scale = (max_dimension as f64 / width as f64).min(max_dimension as f64 / height as f64);
        let target_width = ((width as f64 * scale).round() as u32).clamp(1, max_dimension);
        let target_height = ((height as f64 * scale).round() as u32).clamp(1, max_dimension);

        log::debug!(
            "🧩 预览降采样：{}x{} -> {}x{}（filter={:?}）",
            width,
            height,
            target_width,
            target_height,
            config.preview_filter
        );

        let Some(algorithm) = preview_resize_alg(config.preview_filter) else {
            return image.resize_exact(target_width, target_height, config.preview_filter);
        };

        let mut thumbnail = DynamicImage::new(target_width, target_height, image.color());
        let options = fr::ResizeOptions::new().resize_alg(algorithm);
        match fr::Resizer::new().resize(&image, &mut thumbnail, Some(&options)) {
            Ok(()) => thumbnail,
            Err(err) => {
                log::warn!("⚠️ fast_image_resize 降采样失败，回退 image::resize_exact：{}", err);
                image.resize_exact(target_width, target_height, config.preview_filter)
            }
        }
    }
}

/// 预览档位只会选到这三种滤波器；其余交给 `image::resize_exact`。
fn preview_resize_alg(filter: FilterType) -> Option<fr::ResizeAlg> {
    match filter {
        FilterType::CatmullRom => Some(fr::ResizeAlg::Convolution(fr::FilterType::CatmullRom)),
        FilterType::Triangle => Some(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear)),
        FilterType::Nearest => Some(fr::ResizeAlg::Nearest),
        _ => None,
    }
}
