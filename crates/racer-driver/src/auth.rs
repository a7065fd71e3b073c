//! 会话认证（CSRF token 抓取 + 表单登录）
//!
//! # 握手流程
//!
//! 1. `GET /login`，取回登录页 HTML
//! 2. 按顺序尝试各 [`TokenStrategy`]，第一个命中的作为 CSRF token
//! 3. `POST /login`，表单体 `password=<pw>&csrf_token=<token>`
//! 4. 任意 2xx 视为成功
//!
//! 登录过程中传输层积累的 Cookie 即为会话身份；token 保存在 [`Session`] 中，
//! 之后的每个变更类请求都会带上它（设备不会轮换 token）。
//!
//! 失败时记录 `last_error` 并保持未认证，不会自动重试。

use std::sync::OnceLock;

use racer_protocol::{Endpoint, login_form_body};
use racer_transport::{HttpTransport, TransportError};
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::session::{Credential, Session};

/// CSRF token 抓取策略
///
/// 每种策略独立匹配，默认顺序见 [`TokenStrategy::DEFAULT_ORDER`]。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStrategy {
    /// `<meta name="csrf-token" content="...">`
    MetaTag,
    /// `<input ... name="csrf_token" ... value="...">`
    HiddenInput,
}

impl TokenStrategy {
    pub const DEFAULT_ORDER: [TokenStrategy; 2] =
        [TokenStrategy::MetaTag, TokenStrategy::HiddenInput];

    pub fn name(self) -> &'static str {
        match self {
            TokenStrategy::MetaTag => "meta-tag",
            TokenStrategy::HiddenInput => "hidden-input",
        }
    }

    fn regex(self) -> Option<&'static Regex> {
        static META_TAG: OnceLock<Option<Regex>> = OnceLock::new();
        static HIDDEN_INPUT: OnceLock<Option<Regex>> = OnceLock::new();

        match self {
            TokenStrategy::MetaTag => META_TAG
                .get_or_init(|| {
                    Regex::new(r#"(?i)<meta\s+name\s*=\s*"csrf-token"\s+content\s*=\s*"([^"]+)""#)
                        .ok()
                })
                .as_ref(),
            TokenStrategy::HiddenInput => HIDDEN_INPUT
                .get_or_init(|| {
                    Regex::new(r#"(?i)<input[^>]*name\s*=\s*"csrf_token"[^>]*value\s*=\s*"([^"]+)""#)
                        .ok()
                })
                .as_ref(),
        }
    }

    /// 从 HTML 中提取 token
    pub fn extract(self, html: &str) -> Option<String> {
        self.regex()?
            .captures(html)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

/// 按默认顺序提取 CSRF token，第一个命中的策略生效
///
/// # 示例
///
/// ```rust
/// use racer_driver::extract_csrf_token;
///
/// let html = r#"<input type="hidden" name="csrf_token" value="abc123">"#;
/// assert_eq!(extract_csrf_token(html).as_deref(), Some("abc123"));
/// assert!(extract_csrf_token("<html></html>").is_none());
/// ```
pub fn extract_csrf_token(html: &str) -> Option<String> {
    TokenStrategy::DEFAULT_ORDER
        .iter()
        .find_map(|strategy| strategy.extract(html))
}

/// 会话认证器
///
/// 绑定到一个传输实例（即一台设备）。
#[derive(Debug, Clone)]
pub struct SessionAuthenticator {
    transport: HttpTransport,
    strategies: Vec<TokenStrategy>,
}

impl SessionAuthenticator {
    pub fn new(transport: HttpTransport) -> Self {
        Self {
            transport,
            strategies: TokenStrategy::DEFAULT_ORDER.to_vec(),
        }
    }

    /// 替换 token 抓取策略（按顺序尝试）
    pub fn with_strategies(mut self, strategies: Vec<TokenStrategy>) -> Self {
        self.strategies = strategies;
        self
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    /// 登录并返回已认证的会话
    ///
    /// # 错误
    /// - `AuthError::Network`: 登录页请求未完成或返回非 2xx
    /// - `AuthError::TokenExtraction`: 登录页中找不到 token
    /// - `AuthError::Rejected`: 凭据提交返回非 2xx
    pub async fn authenticate(&self, credential: Credential) -> Result<Session, AuthError> {
        let session = Session::new(self.transport.address().clone(), credential);
        self.handshake(&session).await?;
        Ok(session)
    }

    /// 在现有会话上重新握手（会话过期后使用）
    ///
    /// 成功时原地替换 token 与认证标志；失败时记录 `last_error`。
    pub async fn reauthenticate(&self, session: &Session) -> Result<(), AuthError> {
        info!("Re-authenticating with {}", session.address());
        self.handshake(session).await
    }

    async fn handshake(&self, session: &Session) -> Result<(), AuthError> {
        match self.login(session.credential()).await {
            Ok(token) => {
                session.establish(token);
                info!("Authenticated with {}", session.address());
                Ok(())
            },
            Err(e) => {
                warn!("Authentication with {} failed: {}", session.address(), e);
                session.record_failure(e.to_string());
                Err(e)
            },
        }
    }

    async fn login(&self, credential: &Credential) -> Result<String, AuthError> {
        let page = self.transport.get(Endpoint::LoginPage.path()).await?;
        if !page.is_success() {
            return Err(AuthError::Network(TransportError::Status {
                status: page.status,
            }));
        }

        let html = page.text();
        let token = self.extract_token(&html).ok_or(AuthError::TokenExtraction)?;

        let body = login_form_body(credential.expose(), &token);
        let response = self
            .transport
            .post_form(Endpoint::LoginSubmit.path(), body, &[])
            .await?;
        if !response.is_success() {
            return Err(AuthError::Rejected {
                status: response.status,
            });
        }

        Ok(token)
    }

    fn extract_token(&self, html: &str) -> Option<String> {
        self.strategies.iter().find_map(|strategy| {
            let token = strategy.extract(html)?;
            debug!("CSRF token found via {} strategy", strategy.name());
            Some(token)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const META_PAGE: &str = r#"<!DOCTYPE html>
<html><head>
<meta charset="utf-8">
<meta name="csrf-token" content="IjM0ZGQ1.Zk9x-abc">
</head><body></body></html>"#;

    const INPUT_PAGE: &str = r#"<html><body>
<form method="post">
  <input type="hidden" id="csrf_token" name="csrf_token" value="ImY4OTk2.Zk9x_def">
  <input type="password" name="password">
</form></body></html>"#;

    #[test]
    fn test_meta_tag_strategy() {
        assert_eq!(
            TokenStrategy::MetaTag.extract(META_PAGE).as_deref(),
            Some("IjM0ZGQ1.Zk9x-abc")
        );
        assert!(TokenStrategy::MetaTag.extract(INPUT_PAGE).is_none());
    }

    #[test]
    fn test_hidden_input_strategy() {
        assert_eq!(
            TokenStrategy::HiddenInput.extract(INPUT_PAGE).as_deref(),
            Some("ImY4OTk2.Zk9x_def")
        );
        assert!(TokenStrategy::HiddenInput.extract(META_PAGE).is_none());
    }

    #[test]
    fn test_meta_tag_wins_when_both_present() {
        let html = format!("{}{}", INPUT_PAGE, META_PAGE);
        assert_eq!(
            extract_csrf_token(&html).as_deref(),
            Some("IjM0ZGQ1.Zk9x-abc")
        );
    }

    #[test]
    fn test_no_token() {
        assert!(extract_csrf_token("<html><body>Login</body></html>").is_none());
        assert!(extract_csrf_token(r#"<meta name="csrf-token" content="">"#).is_none());
        assert!(extract_csrf_token("").is_none());
    }

    #[test]
    fn test_case_insensitive_tags() {
        let html = r#"<INPUT TYPE="hidden" NAME="csrf_token" VALUE="upper">"#;
        assert_eq!(extract_csrf_token(html).as_deref(), Some("upper"));
    }

    fn authenticator() -> SessionAuthenticator {
        let address = racer_transport::DeviceAddress::parse("192.168.1.100").unwrap();
        let transport =
            HttpTransport::new(address, racer_transport::TransportConfig::plain_http()).unwrap();
        SessionAuthenticator::new(transport)
    }

    #[test]
    fn test_authenticator_uses_configured_strategies() {
        let html = format!("{}{}", META_PAGE, INPUT_PAGE);

        let default = authenticator();
        assert_eq!(
            default.extract_token(&html).as_deref(),
            Some("IjM0ZGQ1.Zk9x-abc")
        );

        let input_only = authenticator().with_strategies(vec![TokenStrategy::HiddenInput]);
        assert_eq!(
            input_only.extract_token(&html).as_deref(),
            Some("ImY4OTk2.Zk9x_def")
        );

        let reversed = authenticator()
            .with_strategies(vec![TokenStrategy::HiddenInput, TokenStrategy::MetaTag]);
        assert_eq!(
            reversed.extract_token(META_PAGE).as_deref(),
            Some("IjM0ZGQ1.Zk9x-abc")
        );

        let none = authenticator().with_strategies(Vec::new());
        assert!(none.extract_token(&html).is_none());
    }
}
