//! 驱动层错误类型定义

use racer_protocol::ProtocolError;
use racer_transport::TransportError;
use thiserror::Error;

/// 登录握手错误
#[derive(Error, Debug)]
pub enum AuthError {
    /// 请求未完成，或登录页返回非 2xx
    #[error("Network error during login: {0}")]
    Network(#[from] TransportError),

    /// 登录页中找不到 CSRF token
    #[error("CSRF token extraction failed")]
    TokenExtraction,

    /// 凭据提交后设备返回非 2xx
    #[error("Login rejected by device (status {status})")]
    Rejected { status: u16 },
}

/// 设备 API 错误
#[derive(Error, Debug)]
pub enum ApiError {
    /// 请求未完成（连接失败、超时等）
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    /// 设备返回非 2xx
    #[error("Device rejected request (status {status}): {body}")]
    DeviceRejected { status: u16, body: String },

    /// 会话已过期（设备返回登录页 HTML）
    #[error("Session expired, re-authentication required")]
    SessionExpired,

    /// 本地前置条件失败：会话没有 CSRF token，请求未发送
    #[error("Missing CSRF token (not logged in)")]
    MissingCsrfToken,

    /// 本地前置条件失败：会话未认证，请求未发送
    #[error("Session is not authenticated")]
    NotAuthenticated,

    /// 响应体无法解析
    #[error("Failed to decode device response: {0}")]
    Decode(#[from] ProtocolError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::TokenExtraction;
        assert_eq!(err.to_string(), "CSRF token extraction failed");

        let err = AuthError::Rejected { status: 401 };
        assert_eq!(err.to_string(), "Login rejected by device (status 401)");

        let err: AuthError = TransportError::Timeout.into();
        assert!(matches!(err, AuthError::Network(TransportError::Timeout)));
        assert!(err.to_string().contains("Request timeout"));
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::DeviceRejected {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Device rejected request (status 500): boom"
        );

        let err: ApiError = ProtocolError::UnexpectedHtml.into();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
