//! 渲染层使用的只读视图。

use std::fmt::Write as _;

use serde::Serialize;

use crate::capture::AcquisitionSource;
use crate::detection::DetectionResult;

/// 当前图片的展示信息。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageView {
    /// 预览已被释放时为空。
    pub preview_url: Option<String>,
    pub file_name: String,
    pub mime_type: String,
    pub source: AcquisitionSource,
    pub width: u32,
    pub height: u32,
    /// RFC 3339 本地时间。
    pub acquired_at: String,
}

/// 会话快照。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<DetectionResult>,
    pub is_processing: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl SessionView {
    /// 终端报告。
    pub fn render_text(&self) -> String {
        let mut out = String::new();

        if let Some(image) = &self.image {
            let _ = writeln!(
                out,
                "Image: {} ({}, {}x{}, {})",
                image.file_name,
                image.mime_type,
                image.width,
                image.height,
                image.source.as_str()
            );
        }

        if let Some(error) = &self.error {
            let _ = writeln!(out, "Error: {}", error);
        }

        if self.is_processing {
            let _ = writeln!(
                out,
                "Analyzing the image for rice leaf detection and disease classification..."
            );
            return out;
        }

        let Some(result) = &self.result else {
            return out;
        };

        match result.disease() {
            Some(disease) if result.is_rice_leaf() => {
                let _ = writeln!(out, "Rice Leaf Detected");
                let _ = writeln!(out, "Confidence: {:.2}%", result.confidence() * 100.0);
                let _ = writeln!(out);
                let _ = writeln!(out, "{} ({})", disease.name, disease.scientific_name);
                let _ = writeln!(out, "{}", disease.description);
                let _ = writeln!(out);
                let _ = writeln!(out, "Symptoms");
                for symptom in &disease.symptoms {
                    let _ = writeln!(out, "  - {}", symptom);
                }
                let _ = writeln!(out, "Treatment");
                for step in &disease.treatment {
                    let _ = writeln!(out, "  - {}", step);
                }
                if let Some(ms) = result.processing_time() {
                    let _ = writeln!(out);
                    let _ = writeln!(out, "Processing time: {:.2}ms", ms);
                }
            }
            _ => {
                let _ = writeln!(out, "Not a Rice Leaf");
                let _ = writeln!(out, "Please upload an image of a rice leaf for disease detection.");
            }
        }

        out
    }
}
