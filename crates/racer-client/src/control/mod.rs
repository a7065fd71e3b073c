//! 驾驶控制：状态机、输入、周期任务与指标

mod api;
mod controller;
mod inputs;
mod metrics;
mod state;
mod ticker;

pub use api::DriveApi;
pub use controller::{DriveConfig, DriveController};
pub use inputs::DriveInputs;
pub use metrics::{DriveMetrics, DriveMetricsSnapshot};
pub use state::{AtomicDriveState, DriveSessionState, DriveStatus};
