//! 应用设置文件（`settings.json`）。
//!
//! 各段都带 `#[serde(default)]`，文件里只需要写想覆盖的字段。

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::capture::{CaptureConfig, PreviewProfile};
use crate::detection::{DetectorConfig, PipelineConfig};
use crate::error::AppError;

/// 采集段：可调的只是策略参数，滤镜由档位决定。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    pub preview_profile: String,
    pub max_file_size: u64,
    pub max_decoded_pixels: u64,
    pub accepted_mime_types: Vec<String>,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        let defaults = CaptureConfig::default();
        Self {
            preview_profile: defaults.infer_preview_profile().as_str().to_string(),
            max_file_size: defaults.max_file_size,
            max_decoded_pixels: defaults.max_decoded_pixels,
            accepted_mime_types: defaults.accepted_mime_types,
        }
    }
}

impl CaptureSettings {
    pub fn to_capture_config(&self) -> Result<CaptureConfig, AppError> {
        if self.max_file_size == 0 || self.max_decoded_pixels == 0 {
            return Err(AppError::Settings("体积与像素上限必须大于 0".to_string()));
        }
        if self.accepted_mime_types.is_empty() {
            return Err(AppError::Settings("accepted_mime_types 不能为空".to_string()));
        }

        let mut config = CaptureConfig {
            max_file_size: self.max_file_size,
            max_decoded_pixels: self.max_decoded_pixels,
            accepted_mime_types: self.accepted_mime_types.clone(),
            ..CaptureConfig::default()
        };
        config.apply_preview_profile(PreviewProfile::from_str(&self.preview_profile)?);
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub capture: CaptureSettings,
    pub detector: DetectorConfig,
    pub pipeline: PipelineConfig,
    /// 外部病害目录；为空时使用内嵌目录。
    pub catalog_path: Option<PathBuf>,
}

/// 读取设置文件。文件不存在时返回默认值。
pub fn load_settings(path: &Path) -> Result<AppSettings, AppError> {
    if !path.exists() {
        log::info!("未找到设置文件 {}，使用默认设置", path.display());
        return Ok(AppSettings::default());
    }

    let content = fs::read_to_string(path)?;
    let settings = serde_json::from_str::<AppSettings>(&content)
        .map_err(|e| AppError::Settings(format!("解析设置文件失败: {}", e)))?;

    log::info!("已加载设置文件 {}", path.display());
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| AppError::Settings(format!("序列化设置失败: {}", e)))?;

    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capture_settings_round_trip_to_default_config() {
        let config = CaptureSettings::default().to_capture_config().expect("config");
        let defaults = CaptureConfig::default();

        assert_eq!(config.max_file_size, defaults.max_file_size);
        assert_eq!(config.preview_max_dimension, defaults.preview_max_dimension);
    }

    #[test]
    fn unknown_profile_is_rejected() {
        let settings = CaptureSettings {
            preview_profile: "ultra".into(),
            ..CaptureSettings::default()
        };

        assert!(matches!(settings.to_capture_config(), Err(AppError::Capture(_))));
    }

    #[test]
    fn partial_json_keeps_other_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{ "detector": { "seed": 9 }, "capture": { "preview_profile": "speed" } }"#)
                .expect("parse");

        assert_eq!(settings.detector.seed, Some(9));
        assert_eq!(settings.detector.simulated_delay_ms, 2_000);
        assert_eq!(settings.pipeline, PipelineConfig::default());
        assert_eq!(
            settings.capture.to_capture_config().expect("config").preview_max_dimension,
            320
        );
    }
}
