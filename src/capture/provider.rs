//! # 采集编排模块
//!
//! ## 设计思路
//!
//! `CaptureProvider` 只负责“把用户动作变成 ImageAsset”，不持有检测结果。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 按来源加载原始字节并校验签名
//! 3. 读取 header 尺寸并做像素限制
//! 4. 生成预览、登记新句柄、释放旧句柄
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<CaptureConfig>>` 支持运行时切换预览档位。
//! - 单次采集使用同一配置快照。
//! - 当前预览句柄由 provider 自己维护，保证任意时刻最多一个存活预览。
//! - 记录 `load/preview/total` 阶段耗时。

use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use super::source::{ImageAsset, ImageSelection, RawImageData};
use super::{CameraDevice, CaptureConfig, CaptureError, PreviewHandle, PreviewProfile, PreviewRegistry};

/// 当前采集模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    File,
    Camera,
}

/// 图片采集器。
pub struct CaptureProvider {
    config: Arc<RwLock<CaptureConfig>>,
    previews: Arc<PreviewRegistry>,
    current_preview: Mutex<Option<PreviewHandle>>,
    mode: Mutex<CaptureMode>,
}

impl CaptureProvider {
    /// # 示例
    /// ```rust
    /// use rice_disease_detection::capture::{CaptureConfig, CaptureMode, CaptureProvider};
    ///
    /// let provider = CaptureProvider::new(CaptureConfig::default());
    /// assert_eq!(provider.mode()?, CaptureMode::File);
    /// # Ok::<(), rice_disease_detection::capture::CaptureError>(())
    /// ```
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            previews: Arc::new(PreviewRegistry::new()),
            current_preview: Mutex::new(None),
            mode: Mutex::new(CaptureMode::File),
        }
    }

    pub(super) fn config_snapshot(&self) -> Result<CaptureConfig, CaptureError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| CaptureError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    pub fn set_preview_profile(&self, profile: PreviewProfile) -> Result<(), CaptureError> {
        let mut config = self
            .config
            .write()
            .map_err(|_| CaptureError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        config.apply_preview_profile(profile);

        log::info!(
            "⚙️ 已切换预览档位：{:?}（max_dim={}, filter={:?}）",
            profile,
            config.preview_max_dimension,
            config.preview_filter
        );

        Ok(())
    }

    pub fn get_preview_profile(&self) -> Result<PreviewProfile, CaptureError> {
        Ok(self.config_snapshot()?.infer_preview_profile())
    }

    /// 预览登记表（渲染层通过句柄取缩略图）。
    pub fn previews(&self) -> &Arc<PreviewRegistry> {
        &self.previews
    }

    pub fn mode(&self) -> Result<CaptureMode, CaptureError> {
        self.mode
            .lock()
            .map(|mode| *mode)
            .map_err(|_| CaptureError::ResourceLimit("采集模式锁已中毒".to_string()))
    }

    fn set_mode(&self, next: CaptureMode) -> Result<(), CaptureError> {
        let mut mode = self
            .mode
            .lock()
            .map_err(|_| CaptureError::ResourceLimit("采集模式锁已中毒".to_string()))?;
        *mode = next;
        Ok(())
    }

    /// 在文件模式与摄像头模式之间切换，返回切换后的模式。
    pub fn toggle_camera(&self) -> Result<CaptureMode, CaptureError> {
        let next = match self.mode()? {
            CaptureMode::File => CaptureMode::Camera,
            CaptureMode::Camera => CaptureMode::File,
        };
        self.set_mode(next)?;
        Ok(next)
    }

    /// 选择一张图片。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use rice_disease_detection::capture::{CaptureConfig, CaptureProvider, ImageSelection};
    ///
    /// let provider = CaptureProvider::new(CaptureConfig::default());
    /// let asset = provider.select_image(ImageSelection::FilePath("leaf1.jpg".into()))?;
    /// println!("{} -> {}", asset.file_name(), asset.preview());
    /// # Ok::<(), rice_disease_detection::capture::CaptureError>(())
    /// ```
    pub fn select_image(&self, selection: ImageSelection) -> Result<ImageAsset, CaptureError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let load_start = Instant::now();
        let raw = match selection {
            ImageSelection::FilePath(path) => Self::load_from_file(&path, &config)?,
            ImageSelection::Dropped { file_name, bytes } => {
                Self::load_from_dropped(file_name, bytes, &config)?
            }
        };
        let load_elapsed = load_start.elapsed();

        let asset = self.finish_acquisition(raw, &config)?;
        self.set_mode(CaptureMode::File)?;

        log::info!(
            "✅ 图片采集完成 - 文件: {} 类型: {} load={}ms total={}ms",
            asset.file_name(),
            asset.mime_type(),
            load_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(asset)
    }

    /// 拖拽 / 文件选择器一次提供多个文件时，只接受第一个。
    pub fn select_first(&self, offered: Vec<ImageSelection>) -> Result<ImageAsset, CaptureError> {
        let mut offered = offered.into_iter();
        let first = offered.next().ok_or(CaptureError::NoSelection)?;

        let ignored: Vec<String> = offered.map(|selection| selection.describe()).collect();
        if !ignored.is_empty() {
            log::warn!("⚠️ 一次只接受一张图片，已忽略 {} 个文件：{:?}", ignored.len(), ignored);
        }

        self.select_image(first)
    }

    /// 从摄像头截取一帧。
    ///
    /// 设备不可用时回到文件模式并返回错误；成功截图后同样回到文件模式。
    pub fn capture_from_camera(&self, device: &dyn CameraDevice) -> Result<ImageAsset, CaptureError> {
        let config = self.config_snapshot()?;
        let total_start = Instant::now();

        let frame = match device.snapshot() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("⚠️ 摄像头 {} 截图失败，回退到文件选择：{}", device.name(), err);
                self.set_mode(CaptureMode::File)?;
                return Err(err);
            }
        };

        let result = Self::load_from_camera_frame(frame, &config)
            .and_then(|raw| self.finish_acquisition(raw, &config));
        self.set_mode(CaptureMode::File)?;
        let asset = result?;

        log::info!(
            "✅ 摄像头截图完成 - 设备: {} 文件: {} total={}ms",
            device.name(),
            asset.file_name(),
            total_start.elapsed().as_millis()
        );

        Ok(asset)
    }

    /// 清空当前图片，释放其预览资源。
    pub fn clear(&self) -> Result<(), CaptureError> {
        let previous = self
            .current_preview
            .lock()
            .map_err(|_| CaptureError::ResourceLimit("预览句柄锁已中毒".to_string()))?
            .take();

        if let Some(handle) = previous {
            self.previews.release(&handle)?;
            log::info!("🧹 已清空当前图片并释放预览 {}", handle);
        }

        Ok(())
    }

    /// 尺寸检查 + 预览生成 + 句柄替换。
    fn finish_acquisition(
        &self,
        raw: RawImageData,
        config: &CaptureConfig,
    ) -> Result<ImageAsset, CaptureError> {
        let (width, height) = Self::inspect_dimensions_from_memory(&raw.bytes)?;
        Self::validate_pixel_limits(config, width, height)?;

        let preview_start = Instant::now();
        let preview = Self::render_preview(&raw.bytes, config)?;
        log::debug!(
            "🖼️ 预览生成 - {}x{} -> {}x{} preview={}ms",
            width,
            height,
            preview.width,
            preview.height,
            preview_start.elapsed().as_millis()
        );

        let handle = self.previews.allocate(preview)?;
        let previous = {
            let mut current = self
                .current_preview
                .lock()
                .map_err(|_| CaptureError::ResourceLimit("预览句柄锁已中毒".to_string()))?;
            current.replace(handle.clone())
        };
        if let Some(previous) = previous {
            self.previews.release(&previous)?;
        }

        Ok(ImageAsset::new(raw, handle, width, height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::source::{AcquisitionSource, CameraFrame};
    use crate::capture::test_support::png_bytes;

    struct StaticCamera(Vec<u8>);

    impl CameraDevice for StaticCamera {
        fn name(&self) -> &str {
            "static"
        }

        fn snapshot(&self) -> Result<CameraFrame, CaptureError> {
            Ok(CameraFrame::Encoded(self.0.clone()))
        }
    }

    struct DeniedCamera;

    impl CameraDevice for DeniedCamera {
        fn name(&self) -> &str {
            "denied"
        }

        fn snapshot(&self) -> Result<CameraFrame, CaptureError> {
            Err(CaptureError::DeviceUnavailable("permission denied".to_string()))
        }
    }

    fn dropped(name: &str) -> ImageSelection {
        ImageSelection::Dropped {
            file_name: name.to_string(),
            bytes: png_bytes(24, 24),
        }
    }

    #[test]
    fn repeated_selection_keeps_a_single_live_preview() {
        let provider = CaptureProvider::new(CaptureConfig::default());

        let mut last = None;
        for i in 0..10 {
            let asset = provider
                .select_image(dropped(&format!("leaf{}.png", i)))
                .expect("selection should succeed");
            assert_eq!(provider.previews().live_count().expect("count"), 1);
            if let Some(previous) = last.replace(asset.preview().clone()) {
                assert!(provider.previews().get(&previous).expect("get").is_none());
            }
        }
    }

    #[test]
    fn clear_releases_current_preview() {
        let provider = CaptureProvider::new(CaptureConfig::default());
        provider.select_image(dropped("leaf.png")).expect("selection should succeed");

        provider.clear().expect("clear should succeed");
        assert_eq!(provider.previews().live_count().expect("count"), 0);

        provider.clear().expect("clearing twice is harmless");
    }

    #[test]
    fn failed_selection_keeps_previous_preview() {
        let provider = CaptureProvider::new(CaptureConfig::default());
        let asset = provider.select_image(dropped("leaf.png")).expect("selection should succeed");

        let result = provider.select_image(ImageSelection::Dropped {
            file_name: "empty.png".into(),
            bytes: Vec::new(),
        });

        assert!(matches!(result, Err(CaptureError::Empty(_))));
        assert!(provider.previews().get(asset.preview()).expect("get").is_some());
    }

    #[test]
    fn only_first_offered_file_is_accepted() {
        let provider = CaptureProvider::new(CaptureConfig::default());
        let asset = provider
            .select_first(vec![dropped("first.png"), dropped("second.png"), dropped("third.png")])
            .expect("selection should succeed");

        assert_eq!(asset.file_name(), "first.png");
        assert_eq!(provider.previews().live_count().expect("count"), 1);
    }

    #[test]
    fn empty_offer_is_no_selection() {
        let provider = CaptureProvider::new(CaptureConfig::default());
        let result = provider.select_first(Vec::new());

        assert!(matches!(result, Err(CaptureError::NoSelection)));
    }

    #[test]
    fn camera_and_drop_paths_produce_identical_bytes() {
        let provider = CaptureProvider::new(CaptureConfig::default());
        let png = png_bytes(40, 30);

        toggle_into_camera(&provider);
        let from_camera = provider
            .capture_from_camera(&StaticCamera(png.clone()))
            .expect("camera capture should succeed");
        let from_drop = provider
            .select_image(ImageSelection::Dropped {
                file_name: "leaf.png".into(),
                bytes: png.clone(),
            })
            .expect("drop should succeed");

        assert_eq!(from_camera.bytes(), from_drop.bytes());
        assert_eq!(from_camera.source(), AcquisitionSource::Camera);
        assert_eq!(from_camera.dimensions(), (40, 30));
        assert_eq!(provider.mode().expect("mode"), CaptureMode::File);
    }

    #[test]
    fn unavailable_camera_reverts_to_file_mode() {
        let provider = CaptureProvider::new(CaptureConfig::default());
        toggle_into_camera(&provider);

        let result = provider.capture_from_camera(&DeniedCamera);

        assert!(matches!(result, Err(CaptureError::DeviceUnavailable(_))));
        assert_eq!(provider.mode().expect("mode"), CaptureMode::File);
        assert_eq!(provider.previews().live_count().expect("count"), 0);
    }

    #[test]
    fn preview_profile_switch_is_visible() {
        let provider = CaptureProvider::new(CaptureConfig::default());
        provider
            .set_preview_profile(PreviewProfile::Speed)
            .expect("set profile");

        assert_eq!(provider.get_preview_profile().expect("get profile"), PreviewProfile::Speed);
    }

    fn toggle_into_camera(provider: &CaptureProvider) {
        assert_eq!(provider.toggle_camera().expect("toggle"), CaptureMode::Camera);
    }
}
