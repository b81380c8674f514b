//! # 采集配置
//!
//! ## 设计思路
//!
//! 所有“可调策略”集中在 `CaptureConfig`：体积上限、允许的图片类型、像素上限与预览规格。
//! 预览档位（quality / balanced / speed）作为高层语义，映射到底层的预览尺寸与滤镜。

use image::imageops::FilterType;

use super::CaptureError;

/// 默认允许的图片类型（按内容签名判断，而非扩展名）。
pub const DEFAULT_ACCEPTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// 图片采集配置。
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// 单张图片允许的最大字节数。
    pub max_file_size: u64,
    /// 允许的 MIME 类型。
    pub accepted_mime_types: Vec<String>,
    /// 头部尺寸允许的最大像素数（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 预览缩略图单边最大值。
    pub preview_max_dimension: u32,
    /// 预览缩放滤镜。
    pub preview_filter: FilterType,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_file_size: 20 * 1024 * 1024,
            accepted_mime_types: DEFAULT_ACCEPTED_MIME_TYPES
                .iter()
                .map(|mime| mime.to_string())
                .collect(),
            max_decoded_pixels: 40_000_000,
            preview_max_dimension: 640,
            preview_filter: FilterType::Triangle,
        }
    }
}

/// 预览档位。
///
/// - `Quality`：大尺寸、高质量滤镜
/// - `Balanced`：默认
/// - `Speed`：小尺寸、最近邻
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewProfile {
    Quality,
    Balanced,
    Speed,
}

impl PreviewProfile {
    /// 从外部字符串解析档位。
    ///
    /// # 示例
    /// ```rust
    /// use rice_disease_detection::capture::PreviewProfile;
    ///
    /// let p = PreviewProfile::from_str("speed")?;
    /// assert_eq!(p.as_str(), "speed");
    /// # Ok::<(), rice_disease_detection::capture::CaptureError>(())
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(profile: &str) -> Result<Self, CaptureError> {
        match profile.trim().to_lowercase().as_str() {
            "quality" => Ok(Self::Quality),
            "balanced" => Ok(Self::Balanced),
            "speed" => Ok(Self::Speed),
            other => Err(CaptureError::InvalidFormat(format!(
                "未知预览档位：{}（可选：quality / balanced / speed）",
                other
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quality => "quality",
            Self::Balanced => "balanced",
            Self::Speed => "speed",
        }
    }
}

impl CaptureConfig {
    /// 应用指定档位到预览参数。
    pub fn apply_preview_profile(&mut self, profile: PreviewProfile) {
        match profile {
            PreviewProfile::Quality => {
                self.preview_max_dimension = 1280;
                self.preview_filter = FilterType::CatmullRom;
            }
            PreviewProfile::Balanced => {
                self.preview_max_dimension = 640;
                self.preview_filter = FilterType::Triangle;
            }
            PreviewProfile::Speed => {
                self.preview_max_dimension = 320;
                self.preview_filter = FilterType::Nearest;
            }
        }
    }

    /// 从当前参数反推档位。
    pub fn infer_preview_profile(&self) -> PreviewProfile {
        if self.preview_max_dimension >= 1280 {
            PreviewProfile::Quality
        } else if self.preview_max_dimension <= 320 {
            PreviewProfile::Speed
        } else {
            PreviewProfile::Balanced
        }
    }

    /// MIME 类型是否在允许列表中（大小写不敏感）。
    pub fn accepts_mime_type(&self, mime: &str) -> bool {
        self.accepted_mime_types
            .iter()
            .any(|accepted| accepted.eq_ignore_ascii_case(mime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_roundtrip_through_config() {
        for name in ["quality", "balanced", "speed"] {
            let profile = PreviewProfile::from_str(name).expect("valid profile");
            let mut config = CaptureConfig::default();
            config.apply_preview_profile(profile);
            assert_eq!(config.infer_preview_profile(), profile);
            assert_eq!(profile.as_str(), name);
        }
    }

    #[test]
    fn profile_parsing_is_lenient_about_case_and_whitespace() {
        assert_eq!(
            PreviewProfile::from_str("  Quality ").expect("valid profile"),
            PreviewProfile::Quality
        );
    }

    #[test]
    fn rejects_unknown_profile() {
        let result = PreviewProfile::from_str("ultra");
        assert!(matches!(result, Err(CaptureError::InvalidFormat(_))));
    }

    #[test]
    fn default_accepts_jpeg_png_webp_only() {
        let config = CaptureConfig::default();
        assert!(config.accepts_mime_type("image/jpeg"));
        assert!(config.accepts_mime_type("IMAGE/PNG"));
        assert!(config.accepts_mime_type("image/webp"));
        assert!(!config.accepts_mime_type("image/gif"));
        assert!(!config.accepts_mime_type("application/pdf"));
    }
}
