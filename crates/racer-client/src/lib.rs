//! # Racer Client
//!
//! 遥控客户端：驾驶状态机、电量轮询、视频流与可观察状态。
//!
//! ## 模块
//!
//! - `control`: 驾驶状态机（Idle / Starting / Active / Stopping）与 20 Hz 周期任务
//! - `actor`: 串行化输入的驾驶 actor
//! - `battery`: 电量后台轮询
//! - `observer`: 供 UI 层读取的状态快照
//! - `client`: 组合以上部分的 [`RacerClient`]

pub mod actor;
pub mod battery;
pub mod client;
pub mod control;
mod error;
pub mod observer;

pub use actor::DriveHandle;
pub use battery::BatteryPoller;
pub use client::{ClientConfig, RacerClient};
pub use control::{
    DriveApi, DriveConfig, DriveController, DriveMetricsSnapshot, DriveSessionState, DriveStatus,
};
pub use error::{ClientError, DriveError};
pub use observer::{ClientSnapshot, Observer};
