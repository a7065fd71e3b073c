//! # Racer Transport Layer
//!
//! 设备 HTTPS 传输抽象层：
//! - 单个 `reqwest::Client`，带 Cookie 存储（登录后积累的 Cookie 即会话身份）
//! - 显式的 `insecure_skip_verify` 配置项，在构造时一次性设置（设备使用自签名证书）
//! - 普通请求返回原始状态码和响应体，由上层判定成败
//! - 流式请求返回字节块流，供 MJPEG 解码器消费

pub mod address;
pub mod config;
mod http;

pub use address::DeviceAddress;
pub use config::{Scheme, TransportConfig};
pub use http::{ByteStream, HttpTransport, RawResponse};

use thiserror::Error;

/// 传输层统一错误类型
#[derive(Error, Debug)]
pub enum TransportError {
    /// 设备地址非法（应为 `host[:port]`）
    #[error("Invalid device address: {0}")]
    InvalidAddress(String),

    /// HTTP 客户端构建失败
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    /// 请求超时
    #[error("Request timeout")]
    Timeout,

    /// 请求未完成（连接失败、TLS 失败、读取失败等）
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),

    /// 请求头值非法
    #[error("Invalid header value for {name}")]
    InvalidHeader { name: String },

    /// 流式请求返回非 2xx 状态
    #[error("Unexpected HTTP status: {status}")]
    Status { status: u16 },
}

impl TransportError {
    /// 区分超时与其他请求错误
    pub(crate) fn from_request(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else {
            TransportError::Request(err)
        }
    }

    /// 是否为请求层面的失败（请求未完成）
    pub fn is_network(&self) -> bool {
        matches!(self, TransportError::Timeout | TransportError::Request(_))
    }
}
