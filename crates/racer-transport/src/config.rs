//! 传输层配置

use std::time::Duration;

/// URL 协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheme {
    /// 设备默认使用 HTTPS
    #[default]
    Https,
    /// 仅用于本地模拟服务器（测试）
    Http,
}

impl Scheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Https => "https",
            Scheme::Http => "http",
        }
    }
}

/// 传输层配置
///
/// # 证书校验
///
/// 设备使用自签名证书。`insecure_skip_verify = true` 会无条件接受该证书：
/// 这是显式、有文档记录的信任放宽，只在构造 [`HttpTransport`](crate::HttpTransport)
/// 时设置一次，之后不可更改。
///
/// # 超时
///
/// `request_timeout` 应用于登录、驾驶指令、电量查询等普通请求，
/// 防止设备卡死导致控制循环永久挂起。视频流请求只受 `connect_timeout` 约束。
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub scheme: Scheme,
    /// 是否跳过 TLS 证书校验
    pub insecure_skip_verify: bool,
    /// 普通请求总超时
    pub request_timeout: Duration,
    /// 建立连接超时
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            scheme: Scheme::Https,
            insecure_skip_verify: true,
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(3),
            user_agent: concat!("racer-teleop/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl TransportConfig {
    /// 面向本地 HTTP 模拟服务器的配置（测试用）
    pub fn plain_http() -> Self {
        Self {
            scheme: Scheme::Http,
            ..Self::default()
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }
}
