//! 客户端错误类型

use racer_driver::{ApiError, AuthError};
use racer_stream::StreamError;
use racer_transport::TransportError;
use thiserror::Error;

/// 驾驶控制错误
#[derive(Error, Debug)]
pub enum DriveError {
    /// 启动序列（手动模式 → 启动电机）失败，状态已回到 Idle
    #[error("Drive startup failed: {0}")]
    Startup(#[source] ApiError),

    /// 停车指令失败（状态仍然回到 Idle）
    #[error("Failed to stop the car: {0}")]
    Stop(#[source] ApiError),

    /// 驾驶任务已退出
    #[error("Drive actor has shut down")]
    ActorClosed,
}

/// 客户端统一错误类型
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Device API error: {0}")]
    Api(#[from] ApiError),

    #[error("Video stream error: {0}")]
    Stream(#[from] StreamError),

    #[error("Drive control error: {0}")]
    Drive(#[from] DriveError),
}
