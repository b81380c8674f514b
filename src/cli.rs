//! # 命令行入口
//!
//! 终端就是这里的渲染层：每张图片走一遍“采集 → 检测 → 视图”，
//! 以文本报告或 JSON（`--json`）输出。
//!
//! 优先级：命令行参数 > `settings.json` > 内置默认值。

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::capture::{CaptureError, CaptureMode, CaptureProvider, FrameFileCamera, ImageSelection};
use crate::detection::{DetectionPipeline, DiseaseCatalog, DiseaseDetector, MockDetector};
use crate::error::AppError;
use crate::session::{DetectionSession, Generation, SessionView};
use crate::settings::{AppSettings, load_settings, save_settings};

#[derive(Debug, Parser)]
#[command(name = "rice-scan")]
#[command(about = "Rice leaf detection and disease classification")]
pub struct CliArgs {
    /// Image files to diagnose, processed one after another
    pub images: Vec<PathBuf>,

    /// Settings file (JSON); missing file means defaults
    #[arg(long, default_value = "settings.json")]
    pub config: PathBuf,

    /// Take a snapshot from a camera frame file before the images
    #[arg(long)]
    pub camera: Option<PathBuf>,

    /// Alternative disease catalog (JSON)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Seed for reproducible mock results
    #[arg(long)]
    pub seed: Option<u64>,

    /// Simulated inference delay in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Preview profile: quality, balanced or speed
    #[arg(long)]
    pub profile: Option<String>,

    /// Print session views as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the effective settings to the --config path and exit
    #[arg(long)]
    pub write_config: bool,
}

impl CliArgs {
    pub fn apply_overrides(&self, settings: &mut AppSettings) {
        if let Some(path) = &self.catalog {
            settings.catalog_path = Some(path.clone());
        }
        if let Some(seed) = self.seed {
            settings.detector.seed = Some(seed);
        }
        if let Some(delay) = self.delay_ms {
            settings.detector.simulated_delay_ms = delay;
        }
        if let Some(profile) = &self.profile {
            settings.capture.preview_profile = profile.clone();
        }
    }
}

/// 按设置组装会话。
pub fn build_session(settings: &AppSettings) -> Result<DetectionSession<MockDetector>, AppError> {
    let catalog = match &settings.catalog_path {
        Some(path) => Arc::new(DiseaseCatalog::load_from_path(path)?),
        None => DiseaseCatalog::builtin(),
    };

    let detector = MockDetector::new(settings.detector.clone(), Arc::clone(&catalog))?;
    let provider = CaptureProvider::new(settings.capture.to_capture_config()?);
    let pipeline = DetectionPipeline::new(detector, catalog, settings.pipeline.clone());

    Ok(DetectionSession::new(provider, pipeline))
}

async fn detect_and_view<D: DiseaseDetector>(
    session: &DetectionSession<D>,
    generation: Generation,
) -> Result<SessionView, AppError> {
    // 失败已经写进会话状态，视图里会带上错误文案
    if let Err(e) = session.run_detection(generation).await {
        log::error!("检测失败 [{}]：{}", e.code(), e);
    }
    session.view()
}

/// 摄像头（若指定）在前，图片文件依次在后，每次采集产出一份视图。
///
/// 摄像头失败时视图带上设备错误，文件输入照常进行。
/// 非图片或不接受的类型直接跳过。
pub async fn collect_views<D: DiseaseDetector>(
    session: &DetectionSession<D>,
    args: &CliArgs,
) -> Result<Vec<SessionView>, AppError> {
    let mut views = Vec::new();

    if let Some(frame_path) = &args.camera {
        let camera = FrameFileCamera::new(frame_path);
        if session.provider().toggle_camera()? == CaptureMode::Camera {
            match session.capture_from_camera(&camera) {
                Ok(generation) => views.push(detect_and_view(session, generation).await?),
                Err(e) => {
                    log::warn!("摄像头不可用，改用文件输入：{}", e);
                    views.push(session.view()?);
                }
            }
        }
    }

    for path in &args.images {
        match session.select_image(ImageSelection::FilePath(path.clone())) {
            Ok(generation) => views.push(detect_and_view(session, generation).await?),
            Err(AppError::Capture(e)) if e.is_type_rejection() => {
                log::warn!("跳过 {}：{}", path.display(), e);
            }
            Err(_) => views.push(session.view()?),
        }
    }

    Ok(views)
}

pub async fn run(args: CliArgs) -> Result<(), AppError> {
    let mut settings = load_settings(&args.config)?;
    args.apply_overrides(&mut settings);

    if args.write_config {
        save_settings(&args.config, &settings)?;
        log::info!("已写入设置文件 {}", args.config.display());
        return Ok(());
    }

    let session = build_session(&settings)?;
    let views = collect_views(&session, &args).await?;

    if views.is_empty() {
        return Err(CaptureError::NoSelection.into());
    }

    if args.json {
        let json = serde_json::to_string_pretty(&views)
            .map_err(|e| AppError::Settings(format!("序列化输出失败: {}", e)))?;
        println!("{}", json);
    } else {
        for view in &views {
            println!("{}", view.render_text());
        }
    }

    Ok(())
}
