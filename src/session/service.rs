//! # 检测会话
//!
//! ## 设计思路
//!
//! `DetectionSession` 是唯一的逻辑执行者：持有采集器、检测流水线和会话状态。
//! 状态放在 `std::sync::Mutex` 里，锁只在同步片段内持有，绝不跨 `.await`。
//!
//! ## 实现思路
//!
//! 1. 采集成功 → `SelectImage`，返回新代次；失败 → `AcquisitionFailed`，返回错误。
//!    选图入口拿到非图片或不接受的类型时只记日志，会话保持原样
//! 2. `run_detection(generation)` 先以该代次发出 `DetectionStarted`，
//!    释放锁后等待流水线，再带着同一代次回写结果
//! 3. 回写时代次已变化（清空 / 换图）则结果被丢弃，记 warn 日志

use std::sync::{Mutex, MutexGuard};

use crate::capture::{CameraDevice, CaptureError, CaptureProvider, ImageAsset, ImageSelection};
use crate::detection::{DetectionPipeline, DetectionResult, DiseaseDetector};
use crate::error::AppError;

use super::state::{Generation, SessionAction, SessionError, SessionState, Transition};
use super::view::{ImageView, SessionView};

/// 一次检测请求的结局。
#[derive(Debug, Clone)]
pub enum DetectionOutcome {
    /// 结果已写入会话。
    Applied(DetectionResult),
    /// 请求发出后图片已被替换或清空，结果被丢弃。
    Stale,
}

impl DetectionOutcome {
    pub fn result(&self) -> Option<&DetectionResult> {
        match self {
            Self::Applied(result) => Some(result),
            Self::Stale => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale)
    }
}

/// 采集从哪个入口进来。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Picker,
    Camera,
}

pub struct DetectionSession<D> {
    provider: CaptureProvider,
    pipeline: DetectionPipeline<D>,
    state: Mutex<SessionState>,
}

impl<D: DiseaseDetector> DetectionSession<D> {
    pub fn new(provider: CaptureProvider, pipeline: DetectionPipeline<D>) -> Self {
        Self {
            provider,
            pipeline,
            state: Mutex::new(SessionState::new()),
        }
    }

    pub fn provider(&self) -> &CaptureProvider {
        &self.provider
    }

    pub fn pipeline(&self) -> &DetectionPipeline<D> {
        &self.pipeline
    }

    fn lock_state(&self) -> Result<MutexGuard<'_, SessionState>, AppError> {
        self.state
            .lock()
            .map_err(|_| AppError::State("会话状态锁已中毒".to_string()))
    }

    fn record_acquisition(
        &self,
        entry: Entry,
        acquired: Result<ImageAsset, CaptureError>,
    ) -> Result<Generation, AppError> {
        let mut state = self.lock_state()?;
        match acquired {
            Ok(asset) => {
                state.apply(SessionAction::SelectImage(asset));
                Ok(state.generation())
            }
            Err(err) if entry == Entry::Picker && err.is_type_rejection() => {
                log::warn!("⚠️ 忽略不支持的文件 [{}]：{}", err.code(), err);
                Err(err.into())
            }
            Err(err) => {
                log::warn!("⚠️ 采集失败 [{}]：{}", err.code(), err);
                state.apply(SessionAction::AcquisitionFailed(SessionError::from_capture(&err)));
                Err(err.into())
            }
        }
    }

    /// 选择一张图片，返回新的会话代次。
    ///
    /// 非图片或不接受的类型返回 `Err`，但不写入会话错误。
    pub fn select_image(&self, selection: ImageSelection) -> Result<Generation, AppError> {
        self.record_acquisition(Entry::Picker, self.provider.select_image(selection))
    }

    /// 一次提供多个文件时只取第一个。
    pub fn select_first(&self, offered: Vec<ImageSelection>) -> Result<Generation, AppError> {
        self.record_acquisition(Entry::Picker, self.provider.select_first(offered))
    }

    pub fn capture_from_camera(&self, device: &dyn CameraDevice) -> Result<Generation, AppError> {
        self.record_acquisition(Entry::Camera, self.provider.capture_from_camera(device))
    }

    /// 清空图片、结果与错误；进行中的检测随之失效。
    pub fn clear(&self) -> Result<(), AppError> {
        self.provider.clear()?;
        self.lock_state()?.apply(SessionAction::Clear);
        Ok(())
    }

    /// 对指定代次的图片执行检测。
    ///
    /// 检测失败且结果仍然有效时返回 `Err`；结果过期时无论成败都返回 `Ok(Stale)`。
    pub async fn run_detection(&self, generation: Generation) -> Result<DetectionOutcome, AppError> {
        let image = {
            let mut state = self.lock_state()?;
            if state.apply(SessionAction::DetectionStarted(generation)) == Transition::Stale {
                log::warn!("⚠️ 代次 {} 已失效，不再发起检测", generation);
                return Ok(DetectionOutcome::Stale);
            }
            match state.image() {
                Some(image) => image.clone(),
                None => return Ok(DetectionOutcome::Stale),
            }
        };

        let outcome = self.pipeline.detect(image).await;

        let mut state = self.lock_state()?;
        match outcome {
            Ok(result) => {
                let action = SessionAction::DetectionResolved(generation, result.clone());
                if state.apply(action) == Transition::Stale {
                    log::warn!("⚠️ 丢弃过期检测结果（代次 {} → {}）", generation, state.generation());
                    return Ok(DetectionOutcome::Stale);
                }
                Ok(DetectionOutcome::Applied(result))
            }
            Err(err) => {
                let action = SessionAction::DetectionFailed(generation, SessionError::from_detection(&err));
                if state.apply(action) == Transition::Stale {
                    log::warn!("⚠️ 丢弃过期检测错误（代次 {}）：{}", generation, err);
                    return Ok(DetectionOutcome::Stale);
                }
                Err(err.into())
            }
        }
    }

    /// 选择图片后立即检测。
    pub async fn select_and_detect(&self, selection: ImageSelection) -> Result<DetectionOutcome, AppError> {
        let generation = self.select_image(selection)?;
        self.run_detection(generation).await
    }

    /// 渲染层快照。
    pub fn view(&self) -> Result<SessionView, AppError> {
        let state = self.lock_state()?;

        let image = match state.image() {
            Some(asset) => {
                let (width, height) = asset.dimensions();
                Some(ImageView {
                    preview_url: self
                        .provider
                        .previews()
                        .get(asset.preview())?
                        .map(|preview| preview.data_url()),
                    file_name: asset.file_name().to_string(),
                    mime_type: asset.mime_type().to_string(),
                    source: asset.source(),
                    width,
                    height,
                    acquired_at: asset.acquired_at().to_rfc3339(),
                })
            }
            None => None,
        };

        Ok(SessionView {
            image,
            result: state.result().cloned(),
            is_processing: state.is_processing(),
            error: state.error().map(|e| e.user_message().to_string()),
            error_code: state.error().map(|e| e.code()),
        })
    }

    pub fn state_snapshot(&self) -> Result<SessionState, AppError> {
        Ok(self.lock_state()?.clone())
    }
}
