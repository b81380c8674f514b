//! # 检测流水线
//!
//! 包在任意 `DiseaseDetector` 外面的契约守卫：
//! 1. 空图直接拒绝，不调用后端
//! 2. 后端调用受 `timeout_ms` 约束
//! 3. 返回值必须满足 `DetectionResult` 不变量，且病害 id 必须能在目录中找到
//!
//! 违反第 3 条说明后端有缺陷，记 error 日志并返回 `ContractViolation`，绝不把坏结果交给界面。

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::capture::ImageAsset;

use super::{DetectionError, DetectionResult, DiseaseCatalog, DiseaseDetector, PipelineConfig};

pub struct DetectionPipeline<D> {
    detector: D,
    catalog: Arc<DiseaseCatalog>,
    config: PipelineConfig,
}

impl<D: DiseaseDetector> DetectionPipeline<D> {
    pub fn new(detector: D, catalog: Arc<DiseaseCatalog>, config: PipelineConfig) -> Self {
        Self {
            detector,
            catalog,
            config,
        }
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn catalog(&self) -> &Arc<DiseaseCatalog> {
        &self.catalog
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// 执行一次两级检测。
    pub async fn detect(&self, image: ImageAsset) -> Result<DetectionResult, DetectionError> {
        if image.is_empty() {
            log::warn!("⚠️ 拒绝检测空图片：{}", image.file_name());
            return Err(DetectionError::EmptyImage);
        }

        let file_name = image.file_name().to_string();
        let start = Instant::now();
        log::debug!("🔍 [{}] 开始检测：{}（{} 字节）", self.detector.name(), file_name, image.len());

        let limit = Duration::from_millis(self.config.timeout_ms);
        let result = match tokio::time::timeout(limit, self.detector.detect(image)).await {
            Ok(outcome) => outcome?,
            Err(_) => {
                log::warn!("⏱️ [{}] 检测超时：{}", self.detector.name(), file_name);
                return Err(DetectionError::Timeout(self.config.timeout_ms));
            }
        };

        if let Err(e) = self.check_contract(&result) {
            log::error!("❌ [{}] 返回了非法结果：{}", self.detector.name(), e);
            return Err(e);
        }

        log::info!(
            "✅ 检测完成：{} → {}（置信度 {:.2}，耗时 {:?}）",
            file_name,
            result.disease().map(|d| d.id.as_str()).unwrap_or("not-rice-leaf"),
            result.confidence(),
            start.elapsed()
        );
        Ok(result)
    }

    fn check_contract(&self, result: &DetectionResult) -> Result<(), DetectionError> {
        result.validate()?;

        if let Some(disease) = result.disease() {
            if !self.catalog.contains(&disease.id) {
                return Err(DetectionError::ContractViolation(format!(
                    "病害 id 不在目录中：{}",
                    disease.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::test_support::{asset_named, empty_asset};
    use crate::detection::Disease;

    /// 直接返回预设结果的后端。
    struct FixedDetector(Result<DetectionResult, fn() -> DetectionError>);

    impl DiseaseDetector for FixedDetector {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn detect(&self, _image: ImageAsset) -> Result<DetectionResult, DetectionError> {
            match &self.0 {
                Ok(result) => Ok(result.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    struct SlowDetector;

    impl DiseaseDetector for SlowDetector {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn detect(&self, _image: ImageAsset) -> Result<DetectionResult, DetectionError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(DetectionResult::not_rice_leaf(0.5))
        }
    }

    fn pipeline<D: DiseaseDetector>(detector: D) -> DetectionPipeline<D> {
        DetectionPipeline::new(detector, DiseaseCatalog::builtin(), PipelineConfig::default())
    }

    #[tokio::test]
    async fn valid_result_passes_through() {
        let catalog = DiseaseCatalog::builtin();
        let blast = Arc::clone(catalog.get("rice-blast").expect("rice-blast exists"));
        let pipeline = pipeline(FixedDetector(Ok(DetectionResult::rice_leaf(0.95, blast))));

        let result = pipeline.detect(asset_named("leaf1.jpg")).await.expect("detect");

        assert!(result.is_rice_leaf());
        assert_eq!(result.disease().map(|d| d.id.as_str()), Some("rice-blast"));
    }

    #[tokio::test]
    async fn empty_asset_is_rejected_before_backend() {
        let pipeline = pipeline(FixedDetector(Err(|| DetectionError::Backend("called".into()))));

        let result = pipeline.detect(empty_asset("empty.png")).await;

        assert!(matches!(result, Err(DetectionError::EmptyImage)));
    }

    #[tokio::test]
    async fn backend_error_propagates_unchanged() {
        let pipeline = pipeline(FixedDetector(Err(|| DetectionError::Backend("down".into()))));

        let result = pipeline.detect(asset_named("leaf1.jpg")).await;

        assert!(matches!(result, Err(DetectionError::Backend(msg)) if msg == "down"));
    }

    #[tokio::test]
    async fn leaf_without_disease_is_a_contract_violation() {
        let broken = DetectionResult::from_parts(true, 0.9, None, None);
        let pipeline = pipeline(FixedDetector(Ok(broken)));

        let result = pipeline.detect(asset_named("leaf1.jpg")).await;

        assert!(matches!(result, Err(DetectionError::ContractViolation(_))));
    }

    #[tokio::test]
    async fn unknown_disease_id_is_a_contract_violation() {
        let invented = Arc::new(Disease {
            id: "leaf-rust".into(),
            name: "Leaf Rust".into(),
            scientific_name: "Puccinia".into(),
            description: String::new(),
            symptoms: Vec::new(),
            treatment: Vec::new(),
            image_url: String::new(),
        });
        let pipeline = pipeline(FixedDetector(Ok(DetectionResult::rice_leaf(0.95, invented))));

        let result = pipeline.detect(asset_named("leaf1.jpg")).await;

        assert!(matches!(result, Err(DetectionError::ContractViolation(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_backend_times_out() {
        let pipeline = DetectionPipeline::new(
            SlowDetector,
            DiseaseCatalog::builtin(),
            PipelineConfig { timeout_ms: 500 },
        );

        let result = pipeline.detect(asset_named("leaf1.jpg")).await;

        assert!(matches!(result, Err(DetectionError::Timeout(500))));
    }
}
