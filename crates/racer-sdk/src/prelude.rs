//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use racer_sdk::prelude::*;
//! ```

// 客户端层（推荐使用）
pub use crate::client::{ClientConfig, ClientSnapshot, DriveSessionState, Observer, RacerClient};

// 会话与配置
pub use crate::driver::Credential;
pub use crate::stream::{FrameCallback, StreamConfig, VideoFrame};
pub use crate::transport::TransportConfig;

// 状态
pub use crate::protocol::{BatteryBand, BatteryState};

// 错误类型
pub use crate::client::{ClientError, DriveError};
pub use crate::driver::{ApiError, AuthError};
pub use crate::stream::StreamError;
pub use crate::transport::TransportError;
