//! # Racer Driver
//!
//! 设备会话与认证接口层：
//! - `session`: 显式共享的会话句柄（token、认证标志、最近错误）
//! - `auth`: CSRF token 抓取 + 表单登录
//! - `api`: 认证后的驾驶 / 电量接口，带会话过期检测
//! - `metrics`: API 调用计数
//!
//! 大多数用户应该使用 `racer-client` 提供的 `RacerClient`。

pub mod api;
pub mod auth;
mod error;
pub mod metrics;
pub mod session;

pub use api::{BatteryOutcome, DeviceApiClient};
pub use auth::{SessionAuthenticator, TokenStrategy, extract_csrf_token};
pub use error::{ApiError, AuthError};
pub use metrics::{ApiMetrics, ApiMetricsSnapshot};
pub use session::{Credential, Session, SessionSnapshot};
