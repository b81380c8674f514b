//! # 会话状态机
//!
//! 所有状态变更都经过 `SessionState::apply`，没有其他修改入口。
//!
//! ## 代次（generation）
//!
//! 每次选择新图片或清空都会让 `generation` 单调加一。检测请求发起时记下当时的代次，
//! 结果回来时代次不一致就视为过期并丢弃，因此旧图片的检测结果永远不会覆盖新图片。
//! 取消只是逻辑上的：后端调用照常跑完，只是结果不再生效。

use serde::Serialize;

use crate::capture::{CaptureError, ImageAsset};
use crate::detection::{DetectionError, DetectionResult};

/// 单调递增的会话代次。
pub type Generation = u64;

/// 检测失败时展示给用户的通用文案。
pub const DETECTION_FAILURE_MESSAGE: &str =
    "An error occurred while processing the image. Please try again.";

/// 会话中可展示的错误。采集错误与检测错误分开记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SessionError {
    Acquisition { code: &'static str, message: String },
    Detection { code: &'static str, message: String },
}

impl SessionError {
    pub fn from_capture(err: &CaptureError) -> Self {
        Self::Acquisition {
            code: err.code(),
            message: err.to_string(),
        }
    }

    pub fn from_detection(err: &DetectionError) -> Self {
        Self::Detection {
            code: err.code(),
            message: err.to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Acquisition { code, .. } | Self::Detection { code, .. } => *code,
        }
    }

    /// 界面文案：采集错误原样展示（用户可以换一张重试），检测错误只给通用提示。
    pub fn user_message(&self) -> &str {
        match self {
            Self::Acquisition { message, .. } => message.as_str(),
            Self::Detection { .. } => DETECTION_FAILURE_MESSAGE,
        }
    }
}

/// 驱动状态机的动作。
#[derive(Debug, Clone)]
pub enum SessionAction {
    SelectImage(ImageAsset),
    AcquisitionFailed(SessionError),
    Clear,
    DetectionStarted(Generation),
    DetectionResolved(Generation, DetectionResult),
    DetectionFailed(Generation, SessionError),
}

/// `apply` 的结果：`Stale` 表示动作被忽略，状态没有任何变化。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Stale,
}

/// 会话状态。
///
/// 不变量：
/// - `result` 存在时 `image` 一定存在
/// - `processing` 为真时 `image` 存在且 `result` 为空
/// - 检测结果写入时清掉检测期间留下的采集错误
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    generation: Generation,
    image: Option<ImageAsset>,
    result: Option<DetectionResult>,
    error: Option<SessionError>,
    processing: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn image(&self) -> Option<&ImageAsset> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&DetectionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&SessionError> {
        self.error.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.processing
    }

    pub fn apply(&mut self, action: SessionAction) -> Transition {
        match action {
            SessionAction::SelectImage(asset) => {
                self.generation += 1;
                self.image = Some(asset);
                self.reset_outcome();
                Transition::Applied
            }
            SessionAction::AcquisitionFailed(error) => {
                self.error = Some(error);
                Transition::Applied
            }
            SessionAction::Clear => {
                self.generation += 1;
                self.image = None;
                self.reset_outcome();
                Transition::Applied
            }
            SessionAction::DetectionStarted(generation) => {
                if generation != self.generation || self.image.is_none() || self.processing {
                    return Transition::Stale;
                }
                self.reset_outcome();
                self.processing = true;
                Transition::Applied
            }
            SessionAction::DetectionResolved(generation, result) => {
                if !self.awaiting(generation) {
                    return Transition::Stale;
                }
                self.processing = false;
                self.result = Some(result);
                self.error = None;
                Transition::Applied
            }
            SessionAction::DetectionFailed(generation, error) => {
                if !self.awaiting(generation) {
                    return Transition::Stale;
                }
                self.processing = false;
                self.error = Some(error);
                Transition::Applied
            }
        }
    }

    fn awaiting(&self, generation: Generation) -> bool {
        self.processing && generation == self.generation
    }

    fn reset_outcome(&mut self) {
        self.result = None;
        self.error = None;
        self.processing = false;
    }
}
