//! 摄像头能力抽象。
//!
//! 真实设备（webcam / V4L2 / 移动端相机）只需实现 `CameraDevice::snapshot`，
//! 返回一帧编码图片或 Data URL；后续处理与文件路径完全相同。

use std::path::PathBuf;

use super::source::CameraFrame;
use super::CaptureError;

/// 可以截取单帧静态图片的设备。
pub trait CameraDevice: Send + Sync {
    /// 设备名称（用于日志）。
    fn name(&self) -> &str;

    /// 在用户确认后截取一帧。设备不可用时返回 `CaptureError::DeviceUnavailable`。
    fn snapshot(&self) -> Result<CameraFrame, CaptureError>;
}

/// 从文件读取“截图”的设备，文件内容可以是编码图片，也可以是 Data URL 文本。
///
/// 命令行场景下用它模拟浏览器 webcam 的 `getScreenshot()`。
pub struct FrameFileCamera {
    path: PathBuf,
}

impl FrameFileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CameraDevice for FrameFileCamera {
    fn name(&self) -> &str {
        "frame-file"
    }

    fn snapshot(&self) -> Result<CameraFrame, CaptureError> {
        let bytes = std::fs::read(&self.path).map_err(|e| {
            CaptureError::DeviceUnavailable(format!("{}：{}", self.path.display(), e))
        })?;

        let trimmed = bytes.trim_ascii_start();
        if trimmed.starts_with(b"data:") {
            let text = String::from_utf8(trimmed.to_vec())
                .map_err(|e| CaptureError::InvalidFormat(format!("Data URL 不是合法 UTF-8：{}", e)))?;
            return Ok(CameraFrame::DataUrl(text));
        }

        Ok(CameraFrame::Encoded(bytes))
    }
}
