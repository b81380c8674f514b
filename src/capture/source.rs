//! # 采集来源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入语义”和“流水线中间结果”解耦：
//! - `ImageSelection` / `CameraFrame` 表示用户动作带来的输入
//! - `RawImageData` 表示已加载、已校验签名但未生成预览的字节
//! - `ImageAsset` 是交给检测流水线的最终单元

use std::fmt;
use std::path::PathBuf;

use bytes::Bytes;
use chrono::{DateTime, Local};
use serde::Serialize;

/// 文件选择 / 拖拽入口提供的一个候选文件。
#[derive(Debug, Clone)]
pub enum ImageSelection {
    /// 文件选择器返回的本地路径。
    FilePath(PathBuf),
    /// 拖拽进来的文件内容。
    Dropped { file_name: String, bytes: Vec<u8> },
}

impl ImageSelection {
    /// 用于日志的简短描述。
    pub fn describe(&self) -> String {
        match self {
            Self::FilePath(path) => path.display().to_string(),
            Self::Dropped { file_name, bytes } => format!("{} ({} bytes)", file_name, bytes.len()),
        }
    }
}

/// 摄像头截取的单帧。
#[derive(Debug, Clone)]
pub enum CameraFrame {
    /// 已编码的图片字节（JPEG / PNG / WebP）。
    Encoded(Vec<u8>),
    /// `data:image/...;base64,` 形式的截图。
    DataUrl(String),
}

/// 图片来自哪条采集路径。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionSource {
    File,
    Drop,
    Camera,
}

impl AcquisitionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Drop => "drop",
            Self::Camera => "camera",
        }
    }
}

/// 预览资源句柄，形如 `preview://3`。
///
/// 句柄指向 `PreviewRegistry` 中的一份缩略图，被新图片替换或清空时必须释放。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct PreviewHandle(String);

impl PreviewHandle {
    pub(crate) fn from_id(id: u64) -> Self {
        Self(format!("preview://{}", id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PreviewHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 加载阶段输出：原始字节与来源信息。
pub(crate) struct RawImageData {
    pub(crate) bytes: Vec<u8>,
    pub(crate) file_name: String,
    pub(crate) source: AcquisitionSource,
    /// 内容签名识别出的 MIME 类型。
    pub(crate) mime_type: &'static str,
}

/// 采集与检测之间传递的图片单元。
///
/// `bytes` 为不可变共享缓冲，检测方拿到的是独立句柄，不存在共享可变状态。
#[derive(Debug, Clone)]
pub struct ImageAsset {
    bytes: Bytes,
    preview: PreviewHandle,
    mime_type: &'static str,
    file_name: String,
    source: AcquisitionSource,
    width: u32,
    height: u32,
    acquired_at: DateTime<Local>,
}

impl ImageAsset {
    pub(crate) fn new(
        raw: RawImageData,
        preview: PreviewHandle,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            bytes: Bytes::from(raw.bytes),
            preview,
            mime_type: raw.mime_type,
            file_name: raw.file_name,
            source: raw.source,
            width,
            height,
            acquired_at: Local::now(),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    /// 仅供展示，不能代替内容分析。
    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    /// 仅供展示，不能代替内容分析。
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn source(&self) -> AcquisitionSource {
        self.source
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn acquired_at(&self) -> DateTime<Local> {
        self.acquired_at
    }
}
