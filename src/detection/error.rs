//! # 检测错误模型
//!
//! 检测失败是一个独立结果，绝不能被当成“不是水稻叶片”处理。

/// 检测流水线错误。
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("图片内容为空，拒绝检测")]
    EmptyImage,

    #[error("图片无法读取：{0}")]
    UnreadableImage(String),

    #[error("检测后端不可用：{0}")]
    Backend(String),

    #[error("检测超时：超过 {0} 毫秒")]
    Timeout(u64),

    #[error("检测结果违反契约：{0}")]
    ContractViolation(String),

    #[error("病害目录错误：{0}")]
    Catalog(String),
}

impl DetectionError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyImage => "E_EMPTY_IMAGE",
            Self::UnreadableImage(_) => "E_UNREADABLE_IMAGE",
            Self::Backend(_) => "E_BACKEND",
            Self::Timeout(_) => "E_TIMEOUT",
            Self::ContractViolation(_) => "E_CONTRACT_VIOLATION",
            Self::Catalog(_) => "E_CATALOG",
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            Self::EmptyImage | Self::UnreadableImage(_) => "input",
            Self::Backend(_) | Self::Timeout(_) => "inference",
            Self::ContractViolation(_) => "validate",
            Self::Catalog(_) => "catalog",
        }
    }
}
