//! # 随机桩检测器
//!
//! ## 设计思路
//!
//! 在真实模型接入之前模拟远端推理：固定延迟后给出两级判定。
//! - 文件名含负样本标记（默认 `not-rice` / `test-negative`）时固定返回非水稻叶片。
//!   这只是演示用的替身，真实实现必须基于像素内容判断，绝不能看文件名。
//! - 否则第 1 级以 `leaf_pass_probability` 的概率通过。
//! - 第 2 级在目录中均匀随机选一项。
//!
//! 指定 `seed` 时结果可复现，便于测试与演示。

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use regex::RegexSet;
use tokio::time::Instant;

use crate::capture::ImageAsset;

use super::{DetectionError, DetectionResult, DetectorConfig, Disease, DiseaseCatalog, DiseaseDetector};

/// 随机桩检测器。
pub struct MockDetector {
    config: DetectorConfig,
    catalog: Arc<DiseaseCatalog>,
    negative_patterns: RegexSet,
    rng: Mutex<ChaCha8Rng>,
}

impl MockDetector {
    /// # 示例
    /// ```rust
    /// use rice_disease_detection::detection::{DetectorConfig, DiseaseCatalog, MockDetector};
    ///
    /// let mut config = DetectorConfig::default();
    /// config.seed = Some(7);
    /// let detector = MockDetector::new(config, DiseaseCatalog::builtin())?;
    /// # Ok::<(), rice_disease_detection::detection::DetectionError>(())
    /// ```
    pub fn new(config: DetectorConfig, catalog: Arc<DiseaseCatalog>) -> Result<Self, DetectionError> {
        if !(0.0..=1.0).contains(&config.leaf_pass_probability) {
            return Err(DetectionError::Backend(format!(
                "leaf_pass_probability 必须在 0~1 之间：{}",
                config.leaf_pass_probability
            )));
        }

        let negative_patterns = RegexSet::new(
            config
                .negative_markers
                .iter()
                .map(|marker| format!("(?i){}", regex::escape(marker))),
        )
        .map_err(|e| DetectionError::Backend(format!("负样本标记无法编译：{}", e)))?;

        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        log::debug!("🎲 随机桩种子：{}", seed);

        Ok(Self {
            config,
            catalog,
            negative_patterns,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        })
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn matches_negative_marker(&self, file_name: &str) -> bool {
        self.negative_patterns.is_match(file_name)
    }

    fn roll_leaf_presence(&self) -> Result<bool, DetectionError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| DetectionError::Backend("随机数生成器锁已中毒".to_string()))?;
        Ok(rng.gen_bool(self.config.leaf_pass_probability))
    }

    fn pick_disease(&self) -> Result<Arc<Disease>, DetectionError> {
        let all = self.catalog.all();
        if all.is_empty() {
            return Err(DetectionError::Catalog("目录为空，无法分类".to_string()));
        }

        let index = {
            let mut rng = self
                .rng
                .lock()
                .map_err(|_| DetectionError::Backend("随机数生成器锁已中毒".to_string()))?;
            rng.gen_range(0..all.len())
        };
        Ok(Arc::clone(&all[index]))
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

impl DiseaseDetector for MockDetector {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn detect(&self, image: ImageAsset) -> Result<DetectionResult, DetectionError> {
        let start = Instant::now();

        if image.is_empty() {
            return Err(DetectionError::UnreadableImage(format!(
                "{} 没有内容",
                image.file_name()
            )));
        }

        tokio::time::sleep(Duration::from_millis(self.config.simulated_delay_ms)).await;

        if self.matches_negative_marker(image.file_name()) {
            log::debug!("🚫 文件名命中负样本标记：{}", image.file_name());
            return Ok(DetectionResult::not_rice_leaf(self.config.negative_confidence)
                .with_processing_time(elapsed_ms(start)));
        }

        if !self.roll_leaf_presence()? {
            return Ok(DetectionResult::not_rice_leaf(self.config.negative_confidence)
                .with_processing_time(elapsed_ms(start)));
        }

        let disease = self.pick_disease()?;
        Ok(DetectionResult::rice_leaf(self.config.positive_confidence, disease)
            .with_processing_time(elapsed_ms(start)))
    }
}
