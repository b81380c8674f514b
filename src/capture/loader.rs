//! # 加载与校验模块
//!
//! ## 设计思路
//!
//! 统一处理不同来源（本地文件 / 拖拽字节 / 摄像头帧）的原始字节加载，
//! 并在“尽可能早”的阶段执行输入校验，尽快失败。
//!
//! ## 实现思路
//!
//! - 文件：存在性 + metadata 体积限制 + 读取。
//! - 拖拽：直接校验内存字节。
//! - 摄像头：Data URL 解析（解码前预估体积）或直接使用编码字节。
//! - 三条路径最终都走 `validate_image_signature`：空内容、非图片、非允许类型一律拒绝。

use base64::{Engine as _, engine::general_purpose};
use chrono::Local;
use std::path::Path;

use super::source::{AcquisitionSource, CameraFrame, RawImageData};
use super::{CaptureConfig, CaptureError, CaptureProvider};

impl CaptureProvider {
    /// 从本地文件加载图片原始字节。
    pub(super) fn load_from_file(
        path: &Path,
        config: &CaptureConfig,
    ) -> Result<RawImageData, CaptureError> {
        log::info!("📁 开始读取本地图片 - 路径: {}", path.display());

        if !path.exists() {
            return Err(CaptureError::FileSystem(format!(
                "文件不存在：{}",
                path.display()
            )));
        }

        let metadata = std::fs::metadata(path)
            .map_err(|e| CaptureError::FileSystem(format!("无法读取文件信息：{}", e)))?;

        if !metadata.is_file() {
            return Err(CaptureError::FileSystem(format!(
                "不是普通文件：{}",
                path.display()
            )));
        }

        Self::validate_size(metadata.len(), config)?;

        let bytes = std::fs::read(path)
            .map_err(|e| CaptureError::FileSystem(format!("无法读取图片文件：{}", e)))?;
        let mime_type = Self::validate_image_signature(&bytes, config)?;

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(RawImageData {
            bytes,
            file_name,
            source: AcquisitionSource::File,
            mime_type,
        })
    }

    /// 校验拖拽进来的文件内容。
    pub(super) fn load_from_dropped(
        file_name: String,
        bytes: Vec<u8>,
        config: &CaptureConfig,
    ) -> Result<RawImageData, CaptureError> {
        log::info!("📥 开始处理拖拽图片 - 文件名: {}", file_name);

        Self::validate_size(bytes.len() as u64, config)?;
        let mime_type = Self::validate_image_signature(&bytes, config)?;

        Ok(RawImageData {
            bytes,
            file_name,
            source: AcquisitionSource::Drop,
            mime_type,
        })
    }

    /// 将摄像头帧转换为与文件路径完全一致的字节表示。
    pub(super) fn load_from_camera_frame(
        frame: CameraFrame,
        config: &CaptureConfig,
    ) -> Result<RawImageData, CaptureError> {
        log::info!("📷 开始处理摄像头截图");

        let bytes = match frame {
            CameraFrame::Encoded(bytes) => bytes,
            CameraFrame::DataUrl(data) => Self::parse_base64_with_limit(&data, config.max_file_size)?,
        };

        Self::validate_size(bytes.len() as u64, config)?;
        let mime_type = Self::validate_image_signature(&bytes, config)?;

        Ok(RawImageData {
            bytes,
            file_name: Self::camera_file_name(mime_type),
            source: AcquisitionSource::Camera,
            mime_type,
        })
    }

    fn camera_file_name(mime_type: &str) -> String {
        let extension = match mime_type {
            "image/png" => "png",
            "image/webp" => "webp",
            _ => "jpg",
        };
        format!(
            "webcam-capture-{}.{}",
            Local::now().format("%Y%m%d-%H%M%S"),
            extension
        )
    }

    fn validate_size(len: u64, config: &CaptureConfig) -> Result<(), CaptureError> {
        if len == 0 {
            return Err(CaptureError::Empty("文件大小为 0 字节".to_string()));
        }

        if len > config.max_file_size {
            return Err(CaptureError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                len as f64 / 1024.0 / 1024.0,
                config.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    fn estimate_base64_decoded_upper_bound_len(base64_data: &str) -> Result<u64, CaptureError> {
        let len = base64_data.trim().len() as u64;
        if len == 0 {
            return Err(CaptureError::Empty("Base64 数据为空".to_string()));
        }

        len.checked_add(3)
            .map(|padded| padded / 4 * 3)
            .ok_or_else(|| CaptureError::ResourceLimit("Base64 长度溢出".to_string()))
    }

    /// 解析 Data URL 或纯 Base64 字符串，解码前先按长度预估体积。
    pub(super) fn parse_base64_with_limit(
        data: &str,
        max_file_size: u64,
    ) -> Result<Vec<u8>, CaptureError> {
        let normalized = data.trim();

        let base64_data = if normalized.starts_with("data:") {
            if !normalized.starts_with("data:image/") {
                return Err(CaptureError::InvalidFormat("Data URL 不是图片类型".to_string()));
            }
            let base64_start = normalized
                .find(";base64,")
                .ok_or_else(|| CaptureError::InvalidFormat("缺少 base64 标记".to_string()))?;
            &normalized[base64_start + 8..]
        } else {
            normalized
        };

        let estimated_len = Self::estimate_base64_decoded_upper_bound_len(base64_data)?;
        if estimated_len > max_file_size {
            return Err(CaptureError::ResourceLimit(format!(
                "Base64 预计解码体积过大：{:.2} MB（限制：{:.2} MB）",
                estimated_len as f64 / 1024.0 / 1024.0,
                max_file_size as f64 / 1024.0 / 1024.0
            )));
        }

        general_purpose::STANDARD
            .decode(base64_data)
            .map_err(|e| CaptureError::Decode(format!("Base64 解码失败：{}", e)))
    }

    /// 按内容签名识别类型，并检查是否在允许列表中。
    pub(super) fn validate_image_signature(
        bytes: &[u8],
        config: &CaptureConfig,
    ) -> Result<&'static str, CaptureError> {
        if bytes.is_empty() {
            return Err(CaptureError::Empty("图片内容为空".to_string()));
        }

        let kind = infer::get(bytes)
            .ok_or_else(|| CaptureError::InvalidFormat("无法识别图片类型".to_string()))?;

        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(CaptureError::InvalidFormat(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }

        if !config.accepts_mime_type(kind.mime_type()) {
            return Err(CaptureError::UnsupportedType(kind.mime_type().to_string()));
        }

        Ok(kind.mime_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::test_support::png_bytes;

    #[test]
    fn dropped_png_is_accepted_with_sniffed_mime() {
        let config = CaptureConfig::default();
        let raw = CaptureProvider::load_from_dropped("leaf.jpg".into(), png_bytes(8, 8), &config)
            .expect("png should load");

        assert_eq!(raw.mime_type, "image/png");
        assert_eq!(raw.file_name, "leaf.jpg");
        assert_eq!(raw.source, AcquisitionSource::Drop);
    }

    #[test]
    fn zero_byte_file_is_rejected() {
        let config = CaptureConfig::default();
        let result = CaptureProvider::load_from_dropped("empty.png".into(), Vec::new(), &config);

        assert!(matches!(result, Err(CaptureError::Empty(_))));
    }

    #[test]
    fn non_image_payload_is_rejected() {
        let config = CaptureConfig::default();
        let pdf = b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n1 0 obj\n".to_vec();
        let result = CaptureProvider::load_from_dropped("leaf.pdf".into(), pdf, &config);

        assert!(matches!(result, Err(CaptureError::InvalidFormat(_))));
    }

    #[test]
    fn unknown_bytes_are_rejected() {
        let config = CaptureConfig::default();
        let result = CaptureProvider::load_from_dropped("leaf.png".into(), b"hello".to_vec(), &config);

        assert!(matches!(result, Err(CaptureError::InvalidFormat(_))));
    }

    #[test]
    fn gif_is_not_an_accepted_type() {
        let config = CaptureConfig::default();
        let gif = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;".to_vec();
        let result = CaptureProvider::load_from_dropped("leaf.gif".into(), gif, &config);

        assert!(matches!(result, Err(CaptureError::UnsupportedType(_))));
    }

    #[test]
    fn oversize_file_is_rejected_before_signature_check() {
        let mut config = CaptureConfig::default();
        config.max_file_size = 16;
        let result = CaptureProvider::load_from_dropped("leaf.png".into(), png_bytes(32, 32), &config);

        assert!(matches!(result, Err(CaptureError::ResourceLimit(_))));
    }

    #[test]
    fn missing_file_is_a_file_system_error() {
        let config = CaptureConfig::default();
        let result = CaptureProvider::load_from_file(Path::new("/definitely/not/here.png"), &config);

        assert!(matches!(result, Err(CaptureError::FileSystem(_))));
    }

    #[test]
    fn camera_data_url_decodes_to_same_bytes_as_file() {
        let config = CaptureConfig::default();
        let png = png_bytes(16, 9);
        let data_url = format!(
            "data:image/png;base64,{}",
            general_purpose::STANDARD.encode(&png)
        );

        let raw = CaptureProvider::load_from_camera_frame(CameraFrame::DataUrl(data_url), &config)
            .expect("camera frame should load");

        assert_eq!(raw.bytes, png);
        assert_eq!(raw.source, AcquisitionSource::Camera);
        assert!(raw.file_name.starts_with("webcam-capture-"));
        assert!(raw.file_name.ends_with(".png"));
    }

    #[test]
    fn data_url_without_base64_marker_is_rejected() {
        let result = CaptureProvider::parse_base64_with_limit("data:image/png,abcd", u64::MAX);
        assert!(matches!(result, Err(CaptureError::InvalidFormat(_))));
    }

    #[test]
    fn non_image_data_url_is_rejected() {
        let result = CaptureProvider::parse_base64_with_limit("data:text/plain;base64,SGVsbG8=", u64::MAX);
        assert!(matches!(result, Err(CaptureError::InvalidFormat(_))));
    }

    #[test]
    fn parse_base64_with_limit_rejects_large_payload_before_decode() {
        let huge = "A".repeat(1024 * 1024);
        let result = CaptureProvider::parse_base64_with_limit(&huge, 32);

        assert!(matches!(result, Err(CaptureError::ResourceLimit(_))));
    }
}
