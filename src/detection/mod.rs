//! # 检测流水线模块（detection）
//!
//! ## 设计思路
//!
//! 检测分两级，顺序执行：
//! 1. 叶片识别：这张图是不是水稻叶片（布尔值 + 置信度）
//! 2. 病害分类：仅在第 1 级通过时执行，从固定病害目录中选出一项（含 `healthy`）
//!
//! 具体决策逻辑藏在 `DiseaseDetector` 能力接口后面：随机桩实现与未来的真实推理后端
//! 可以互相替换，调用方不需要改动。
//!
//! - `types`：`Disease` / `DetectionResult` 及其不变量
//! - `catalog`：只读病害目录（进程内只加载一次）
//! - `detector`：能力接口
//! - `mock`：随机桩实现
//! - `pipeline`：契约守卫（空图拒绝、超时、结果校验）
//!
//! 检测失败（`Err`）与“不是水稻叶片”（`Ok` 且 `is_rice_leaf == false`）严格区分。

mod catalog;
mod config;
mod detector;
mod error;
mod mock;
mod pipeline;
mod types;

pub use catalog::{DiseaseCatalog, HEALTHY_DISEASE_ID};
pub use config::{DetectorConfig, PipelineConfig};
pub use detector::DiseaseDetector;
pub use error::DetectionError;
pub use mock::MockDetector;
pub use pipeline::DetectionPipeline;
pub use types::{DetectionResult, Disease};
