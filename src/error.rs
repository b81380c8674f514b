//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 各子模块有自己的错误枚举（`CaptureError` / `DetectionError`），
//! 会话层与命令行入口统一返回 `Result<T, AppError>`。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为子模块错误提供 `From` 转换，调用方直接用 `?`。
//! - 实现 `Serialize` 将错误序列化为字符串，`--json` 输出与渲染层共用。

use serde::Serialize;

use crate::capture::CaptureError;
use crate::detection::DetectionError;

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 图片采集失败（读取 / 校验 / 预览 / 摄像头）
    #[error("{0}")]
    Capture(#[from] CaptureError),

    /// 检测失败（后端错误 / 超时 / 契约违规）
    #[error("{0}")]
    Detection(#[from] DetectionError),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件不可用
    #[error("设置文件错误: {0}")]
    Settings(String),

    /// 会话状态不可用（锁中毒）
    #[error("会话状态错误: {0}")]
    State(String),
}

impl AppError {
    /// 稳定错误码，子模块错误沿用自己的编码。
    pub fn code(&self) -> &'static str {
        match self {
            Self::Capture(e) => e.code(),
            Self::Detection(e) => e.code(),
            Self::Io(_) => "E_IO",
            Self::Settings(_) => "E_SETTINGS",
            Self::State(_) => "E_STATE",
        }
    }
}

/// 将错误序列化为人类可读的字符串。
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_plain_string() {
        let err = AppError::Settings("bad json".into());
        let json = serde_json::to_string(&err).expect("serialize");

        assert_eq!(json, "\"设置文件错误: bad json\"");
    }

    #[test]
    fn module_errors_keep_their_codes() {
        let capture: AppError = CaptureError::NoSelection.into();
        let detection: AppError = DetectionError::Timeout(5).into();

        assert_eq!(capture.code(), "E_NO_SELECTION");
        assert_eq!(detection.code(), "E_TIMEOUT");
    }
}
