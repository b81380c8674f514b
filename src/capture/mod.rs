//! # 图片采集模块（capture）
//!
//! ## 设计思路
//!
//! 该模块把“选择文件 / 拖拽 / 摄像头截帧”三条入口收敛为同一种输出：`ImageAsset`。
//! 下游检测流水线只看到字节与预览句柄，不关心图片是怎么来的。
//!
//! - `provider`：编排采集流程，维护采集模式与当前预览句柄
//! - `loader`：文件 / 拖拽字节 / Data URL 加载与签名校验
//! - `preview`：尺寸检查、完整解码、预览缩略图生成与登记
//! - `camera`：摄像头能力抽象（`CameraDevice`）
//! - `config/error/source`：配置、错误、数据模型
//!
//! ## 新同事快速上手
//!
//! ```text
//! 用户动作（选择 / 拖拽 / 拍照）
//!    ↓
//! provider.rs（取第一个文件、切换采集模式）
//!    ├─ loader.rs（读取字节 + 空文件/体积/类型校验）
//!    └─ preview.rs（头部尺寸 + 像素上限 + 生成预览并释放旧预览）
//!    ↓
//! ImageAsset → 会话状态机 → 检测流水线
//! ```
//!
//! 采集阶段的错误只在这里处理，永远不会进入检测流水线。

mod camera;
mod config;
mod error;
mod loader;
mod preview;
mod provider;
mod source;

pub use camera::{CameraDevice, FrameFileCamera};
pub use config::{CaptureConfig, PreviewProfile};
pub use error::CaptureError;
pub use preview::{PreviewImage, PreviewRegistry};
pub use provider::{CaptureMode, CaptureProvider};
pub use source::{AcquisitionSource, CameraFrame, ImageAsset, ImageSelection, PreviewHandle};

#[cfg(test)]
pub(crate) mod test_support;
