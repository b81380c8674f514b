//! # 会话模块（session）
//!
//! 把采集与检测串成一个有状态的会话：
//! - `state`：纯状态机（`SessionAction` → `Transition`），带代次防止过期结果落地
//! - `service`：`DetectionSession`，驱动采集器与检测流水线
//! - `view`：渲染层读取的快照与终端报告

mod service;
mod state;
mod view;

pub use service::{DetectionOutcome, DetectionSession};
pub use state::{
    DETECTION_FAILURE_MESSAGE, Generation, SessionAction, SessionError, SessionState, Transition,
};
pub use view::{ImageView, SessionView};
