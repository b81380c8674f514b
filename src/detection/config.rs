//! # 检测配置
//!
//! `DetectorConfig` 描述随机桩的行为，`PipelineConfig` 描述契约守卫。
//! 两者都可以被 `settings.json` 的同名段覆盖。

use serde::{Deserialize, Serialize};

/// 随机桩检测器配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// 模拟远端调用的延迟（毫秒）。
    pub simulated_delay_ms: u64,
    /// 第 1 级判定通过的概率。
    pub leaf_pass_probability: f64,
    /// 文件名包含这些标记（大小写不敏感）时固定判定为非水稻叶片。
    pub negative_markers: Vec<String>,
    /// 非水稻叶片结果的置信度。
    pub negative_confidence: f32,
    /// 病害分类结果的置信度。
    pub positive_confidence: f32,
    /// 随机种子；为空时使用系统熵。
    pub seed: Option<u64>,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            simulated_delay_ms: 2_000,
            leaf_pass_probability: 0.9,
            negative_markers: vec!["not-rice".to_string(), "test-negative".to_string()],
            negative_confidence: 0.92,
            positive_confidence: 0.95,
            seed: None,
        }
    }
}

/// 检测流水线配置。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 单次检测允许的最长耗时（毫秒）。
    pub timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}
