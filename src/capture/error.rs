//! # 采集错误模型
//!
//! ## 设计思路
//!
//! 采集链路的所有失败都是“可恢复”的：用户可以换一张图或换一种采集方式重试。
//! 通过 `thiserror` 保持可读消息，`code()` / `stage()` 提供稳定的机器可读标识。

/// 图片采集统一错误类型。
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("文件错误：{0}")]
    FileSystem(String),

    #[error("图片内容为空：{0}")]
    Empty(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("不支持的图片类型：{0}（可选：JPEG / PNG / WebP）")]
    UnsupportedType(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),

    #[error("摄像头不可用：{0}")]
    DeviceUnavailable(String),

    #[error("未提供任何图片")]
    NoSelection,
}

impl CaptureError {
    /// 稳定错误码，供渲染层区分提示文案。
    pub fn code(&self) -> &'static str {
        match self {
            Self::FileSystem(_) => "E_FILE_SYSTEM",
            Self::Empty(_) => "E_EMPTY_IMAGE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::UnsupportedType(_) => "E_UNSUPPORTED_TYPE",
            Self::Decode(_) => "E_DECODE",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
            Self::DeviceUnavailable(_) => "E_DEVICE_UNAVAILABLE",
            Self::NoSelection => "E_NO_SELECTION",
        }
    }

    /// 出错所在的采集阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::FileSystem(_) | Self::Empty(_) => "load",
            Self::InvalidFormat(_) | Self::UnsupportedType(_) | Self::ResourceLimit(_) => "validate",
            Self::Decode(_) => "preview",
            Self::DeviceUnavailable(_) => "camera",
            Self::NoSelection => "select",
        }
    }

    /// 文件不是图片或类型不在接受列表内。选图入口对这类文件不做提示。
    pub fn is_type_rejection(&self) -> bool {
        matches!(self, Self::InvalidFormat(_) | Self::UnsupportedType(_))
    }
}
