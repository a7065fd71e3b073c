//! 会话句柄
//!
//! `Session` 是显式传递的共享句柄（`Arc` 内部共享），不存在进程级单例。
//! 字段只能由认证器和 API 客户端（过期检测）在同一把锁下修改，
//! 外部只读。
//!
//! # 不变量
//!
//! - 持有 CSRF token ⇔ 已认证
//! - 凭据不会出现在日志和 `Debug` 输出中

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use racer_transport::DeviceAddress;

/// 设备登录凭据（密码）
///
/// `Debug` 输出已脱敏。
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// 读取明文（仅用于构建登录表单）
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

#[derive(Default)]
struct SessionState {
    csrf_token: Option<String>,
    authenticated: bool,
    last_error: Option<String>,
}

struct SessionInner {
    address: DeviceAddress,
    credential: Credential,
    state: RwLock<SessionState>,
}

/// 会话状态快照（一致读取）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub has_csrf_token: bool,
    pub last_error: Option<String>,
}

/// 设备会话
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

impl Session {
    /// 创建未认证的会话
    pub fn new(address: DeviceAddress, credential: Credential) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                address,
                credential,
                state: RwLock::new(SessionState::default()),
            }),
        }
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.inner.address
    }

    pub(crate) fn credential(&self) -> &Credential {
        &self.inner.credential
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.inner.state.read().csrf_token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.state.read().authenticated
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.state.read().last_error.clone()
    }

    /// 一次加锁读取全部字段
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.inner.state.read();
        SessionSnapshot {
            authenticated: state.authenticated,
            has_csrf_token: state.csrf_token.is_some(),
            last_error: state.last_error.clone(),
        }
    }

    /// 清空 token 与认证标志（断开连接时调用）
    pub fn reset(&self) {
        let mut state = self.inner.state.write();
        *state = SessionState::default();
    }

    pub(crate) fn establish(&self, csrf_token: String) {
        let mut state = self.inner.state.write();
        state.csrf_token = Some(csrf_token);
        state.authenticated = true;
        state.last_error = None;
    }

    pub(crate) fn record_failure(&self, message: String) {
        let mut state = self.inner.state.write();
        state.csrf_token = None;
        state.authenticated = false;
        state.last_error = Some(message);
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("Session")
            .field("address", &self.inner.address)
            .field("credential", &self.inner.credential)
            .field("has_csrf_token", &state.csrf_token.is_some())
            .field("authenticated", &state.authenticated)
            .field("last_error", &state.last_error)
            .finish()
    }
}
