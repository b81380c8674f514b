//! 单元测试共用的图片构造工具。

use image::{DynamicImage, ImageBuffer, ImageFormat, Rgba};
use std::io::Cursor;

pub(crate) fn encode_image(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        let r = (x % 255) as u8;
        let g = (y % 255) as u8;
        let b = ((x + y) % 255) as u8;
        Rgba([r, g, b, 255])
    });

    let dyn_img = DynamicImage::ImageRgba8(img);
    let mut cursor = Cursor::new(Vec::new());
    dyn_img
        .write_to(&mut cursor, format)
        .expect("failed to encode test image");
    cursor.into_inner()
}

pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode_image(width, height, ImageFormat::Png)
}

/// 通过真实采集路径构造一个 `ImageAsset`。
pub(crate) fn asset_named(file_name: &str) -> super::ImageAsset {
    let provider = super::CaptureProvider::new(super::CaptureConfig::default());
    provider
        .select_image(super::ImageSelection::Dropped {
            file_name: file_name.to_string(),
            bytes: png_bytes(16, 16),
        })
        .expect("test asset should load")
}

/// 绕过采集校验构造一个零字节的 `ImageAsset`，用于检测侧的防御测试。
pub(crate) fn empty_asset(file_name: &str) -> super::ImageAsset {
    let raw = super::source::RawImageData {
        bytes: Vec::new(),
        file_name: file_name.to_string(),
        source: super::AcquisitionSource::Drop,
        mime_type: "image/png",
    };
    super::ImageAsset::new(raw, super::PreviewHandle::from_id(0), 0, 0)
}
