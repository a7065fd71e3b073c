//! Racer SDK - 小车遥控 Rust SDK
//!
//! 通过设备的 HTTPS 接口登录、手动驾驶、查询电量并接收 MJPEG 视频。
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **协议层** (`protocol`): 接口路径、请求体、电量解析、表单编码
//! - **传输层** (`transport`): 带 Cookie 存储的 HTTPS 客户端
//! - **驱动层** (`driver`): 会话、CSRF 登录、认证后的设备接口
//! - **视频层** (`stream`): JPEG 帧提取与视频流读取任务
//! - **客户端层** (`client`): 驾驶状态机、电量轮询、可观察状态
//!
//! # 快速开始
//!
//! ```no_run
//! use racer_sdk::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! racer_sdk::init_logger("racer=info").ok();
//!
//! let mut client =
//!     RacerClient::connect("192.168.1.100", Credential::new("secret"), ClientConfig::default())
//!         .await?;
//! client.update_steering(-0.2)?;
//! client.update_throttle(0.4)?;
//! # client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

mod logging;
pub mod prelude;

pub use racer_client as client;
pub use racer_driver as driver;
pub use racer_protocol as protocol;
pub use racer_stream as stream;
pub use racer_transport as transport;

// 协议层
pub use racer_protocol::{BatteryBand, BatteryState, DriveCommand, ProtocolError};

// 传输层
pub use racer_transport::{DeviceAddress, TransportConfig, TransportError};

// 驱动层
pub use racer_driver::{ApiError, AuthError, BatteryOutcome, Credential, Session};

// 视频层
pub use racer_stream::{ChannelFrameHook, FrameCallback, StreamConfig, StreamError, VideoFrame};

// 客户端层（推荐入口）
pub use racer_client::{
    ClientConfig, ClientError, ClientSnapshot, DriveConfig, DriveError, DriveSessionState,
    Observer, RacerClient,
};

pub use logging::{LoggerError, init_logger};
