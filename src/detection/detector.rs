//! 检测能力接口。

use std::future::Future;

use crate::capture::ImageAsset;

use super::{DetectionError, DetectionResult};

/// 两级检测能力：输入一张图片，输出一个 `DetectionResult`。
///
/// 单次调用、异步、不在内部重试；重试策略由调用方决定。
/// 实现方可以是随机桩，也可以是真实推理后端。
pub trait DiseaseDetector: Send + Sync {
    /// 后端名称（用于日志）。
    fn name(&self) -> &'static str;

    /// 执行检测。图片所有权随调用转移。
    fn detect(
        &self,
        image: ImageAsset,
    ) -> impl Future<Output = Result<DetectionResult, DetectionError>> + Send;
}
