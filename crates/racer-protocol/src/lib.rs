//! # Racer Protocol
//!
//! 小车设备 HTTP 接口协议定义（无网络依赖）
//!
//! ## 模块
//!
//! - `endpoints`: 设备接口路径与方法
//! - `constants`: 协议常量定义
//! - `control`: 控制请求体构建（驾驶模式、启停、手动驾驶）
//! - `feedback`: 反馈解析（电量、会话过期嗅探）
//! - `form`: 登录表单编码
//!
//! ## 数据格式
//!
//! 控制接口使用 JSON 请求体，登录接口使用
//! `application/x-www-form-urlencoded` 表单。

pub mod constants;
pub mod control;
pub mod endpoints;
pub mod feedback;
pub mod form;

// 重新导出常用类型
pub use constants::*;
pub use control::*;
pub use endpoints::*;
pub use feedback::*;
pub use form::*;

use thiserror::Error;

/// 协议层错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// JSON 反序列化失败
    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    /// 期望 JSON，实际收到 HTML 文档
    #[error("Unexpected HTML document where JSON was expected")]
    UnexpectedHtml,
}
