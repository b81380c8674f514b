//! # 水稻叶片病害检测：库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                渲染层 (rice-scan 命令行)                  │
//! │        文本报告 / --json  ←  SessionView 快照             │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ Result<T, AppError>
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕                                                  │
//! │  ┌─ session ──── DetectionSession（唯一执行者）           │
//! │  │   ├─ state      SessionAction → Transition（代次）      │
//! │  │   └─ view       SessionView / 终端报告                 │
//! │  │                                                       │
//! │  ├─ capture ──── 文件 / 拖拽 / 摄像头 → ImageAsset         │
//! │  │   ├─ loader     签名校验 · 体积限制 · data URL          │
//! │  │   └─ preview    降采样预览 + 句柄登记                   │
//! │  │                                                       │
//! │  ├─ detection ── DiseaseDetector 能力接口                  │
//! │  │   ├─ mock       随机桩（固定延迟 + 两级判定）           │
//! │  │   ├─ pipeline   空图拒绝 · 超时 · 结果契约校验          │
//! │  │   └─ catalog    内嵌病害目录（15 项，含 healthy）       │
//! │  │                                                       │
//! │  ├─ settings       settings.json 读写                     │
//! │  └─ error          AppError（统一错误类型）               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError`，会话层与命令行的返回类型 |
//! | [`capture`] | 图片采集、格式与体积校验、预览生成与释放 |
//! | [`detection`] | 两级检测接口、随机桩实现、契约守卫、病害目录 |
//! | [`session`] | 会话状态机、过期结果丢弃、渲染快照 |
//! | [`settings`] | 设置文件加载与保存 |
//! | [`cli`] | 命令行参数与运行流程 |

pub mod error;
pub mod capture;
pub mod detection;
pub mod session;
pub mod settings;
pub mod cli;
