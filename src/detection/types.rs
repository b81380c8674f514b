//! 检测结果与病害条目。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::DetectionError;

/// 病害目录中的一个条目（只读）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disease {
    pub id: String,
    pub name: String,
    pub scientific_name: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
    pub image_url: String,
}

/// 一次检测调用的不可变输出。
///
/// 不变量：`disease.is_some() == is_rice_leaf`，`confidence ∈ [0, 1]`，
/// `processing_time`（毫秒）存在时非负。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    is_rice_leaf: bool,
    confidence: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    disease: Option<Arc<Disease>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    processing_time: Option<f64>,
}

impl DetectionResult {
    /// 第 1 级判定为非水稻叶片。
    pub fn not_rice_leaf(confidence: f32) -> Self {
        Self {
            is_rice_leaf: false,
            confidence,
            disease: None,
            processing_time: None,
        }
    }

    /// 两级都完成，附带病害目录中的条目。
    pub fn rice_leaf(confidence: f32, disease: Arc<Disease>) -> Self {
        Self {
            is_rice_leaf: true,
            confidence,
            disease: Some(disease),
            processing_time: None,
        }
    }

    /// 不做任何检查的原始构造，真实后端适配层使用；结果由流水线统一校验。
    pub fn from_parts(
        is_rice_leaf: bool,
        confidence: f32,
        disease: Option<Arc<Disease>>,
        processing_time: Option<f64>,
    ) -> Self {
        Self {
            is_rice_leaf,
            confidence,
            disease,
            processing_time,
        }
    }

    pub fn with_processing_time(mut self, millis: f64) -> Self {
        self.processing_time = Some(millis);
        self
    }

    pub fn is_rice_leaf(&self) -> bool {
        self.is_rice_leaf
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn disease(&self) -> Option<&Disease> {
        self.disease.as_deref()
    }

    pub fn processing_time(&self) -> Option<f64> {
        self.processing_time
    }

    /// 检查结果不变量。
    pub fn validate(&self) -> Result<(), DetectionError> {
        if !self.confidence.is_finite() || !(0.0..=1.0).contains(&self.confidence) {
            return Err(DetectionError::ContractViolation(format!(
                "置信度超出 [0, 1]：{}",
                self.confidence
            )));
        }

        if let Some(ms) = self.processing_time {
            if !ms.is_finite() || ms < 0.0 {
                return Err(DetectionError::ContractViolation(format!(
                    "处理耗时为负或非法：{}",
                    ms
                )));
            }
        }

        match (self.is_rice_leaf, &self.disease) {
            (true, None) => Err(DetectionError::ContractViolation(
                "判定为水稻叶片但未附带病害".to_string(),
            )),
            (false, Some(disease)) => Err(DetectionError::ContractViolation(format!(
                "判定为非水稻叶片却附带病害：{}",
                disease.id
            ))),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blast() -> Arc<Disease> {
        Arc::new(Disease {
            id: "rice-blast".into(),
            name: "Rice Blast".into(),
            scientific_name: "Magnaporthe oryzae".into(),
            description: "desc".into(),
            symptoms: vec!["a".into()],
            treatment: vec!["b".into()],
            image_url: "img".into(),
        })
    }

    #[test]
    fn negative_result_serializes_without_disease() {
        let result = DetectionResult::not_rice_leaf(0.92);
        let json = serde_json::to_value(&result).expect("serialize");

        assert_eq!(json, serde_json::json!({ "isRiceLeaf": false, "confidence": 0.92f32 }));
    }

    #[test]
    fn positive_result_uses_camel_case_keys() {
        let result = DetectionResult::rice_leaf(0.95, blast()).with_processing_time(12.5);
        let json = serde_json::to_value(&result).expect("serialize");

        assert_eq!(json["isRiceLeaf"], true);
        assert_eq!(json["processingTime"], 12.5);
        assert_eq!(json["disease"]["id"], "rice-blast");
        assert_eq!(json["disease"]["scientificName"], "Magnaporthe oryzae");
        assert!(json["disease"].get("imageUrl").is_some());
    }

    #[test]
    fn constructors_produce_valid_results() {
        assert!(DetectionResult::not_rice_leaf(0.92).validate().is_ok());
        assert!(DetectionResult::rice_leaf(0.95, blast()).validate().is_ok());
    }

    #[test]
    fn leaf_without_disease_is_a_violation() {
        let result = DetectionResult::from_parts(true, 0.9, None, None);
        assert!(matches!(result.validate(), Err(DetectionError::ContractViolation(_))));
    }

    #[test]
    fn non_leaf_with_disease_is_a_violation() {
        let result = DetectionResult::from_parts(false, 0.9, Some(blast()), None);
        assert!(matches!(result.validate(), Err(DetectionError::ContractViolation(_))));
    }

    #[test]
    fn out_of_range_values_are_violations() {
        for result in [
            DetectionResult::not_rice_leaf(1.01),
            DetectionResult::not_rice_leaf(-0.1),
            DetectionResult::not_rice_leaf(f32::NAN),
            DetectionResult::not_rice_leaf(0.5).with_processing_time(-1.0),
        ] {
            assert!(matches!(result.validate(), Err(DetectionError::ContractViolation(_))));
        }
    }
}
