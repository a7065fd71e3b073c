//! 驾驶会话状态
//!
//! 状态只由 [`DriveController`](super::DriveController) 修改，其他任务通过
//! [`DriveStatus`] 只读观察。

use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::RwLock;

/// 驾驶会话状态
///
/// ```text
/// Idle ──(任一输入非零)──▶ Starting ──(模式+启动+稳定延时)──▶ Active
///  ▲                          │ 失败                            │
///  └──────────────────────────┘                                 │
///  └──────────── Stopping ◀──────(两个输入都为零)────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum DriveSessionState {
    #[default]
    Idle = 0,
    Starting = 1,
    Active = 2,
    Stopping = 3,
}

impl DriveSessionState {
    /// 无效值返回 Idle
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Starting,
            2 => Self::Active,
            3 => Self::Stopping,
            _ => Self::Idle,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// 电机已启动或正在启动
    pub fn is_driving(self) -> bool {
        matches!(self, Self::Starting | Self::Active)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Active => "active",
            Self::Stopping => "stopping",
        }
    }
}

/// 驾驶状态（原子版本，用于任务间共享）
#[derive(Debug, Default)]
pub struct AtomicDriveState {
    inner: AtomicU8,
}

impl AtomicDriveState {
    pub fn new(state: DriveSessionState) -> Self {
        Self {
            inner: AtomicU8::new(state.as_u8()),
        }
    }

    pub fn get(&self) -> DriveSessionState {
        DriveSessionState::from_u8(self.inner.load(Ordering::Acquire))
    }

    pub fn set(&self, state: DriveSessionState) {
        self.inner.store(state.as_u8(), Ordering::Release);
    }
}

/// 可观察的驾驶状态：当前状态 + 最近一次驾驶错误
#[derive(Debug, Default)]
pub struct DriveStatus {
    state: AtomicDriveState,
    last_error: RwLock<Option<String>>,
}

impl DriveStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DriveSessionState {
        self.state.get()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    pub(crate) fn set_state(&self, state: DriveSessionState) {
        self.state.set(state);
    }

    pub(crate) fn record_error(&self, message: String) {
        *self.last_error.write() = Some(message);
    }

    pub(crate) fn clear_error(&self) {
        *self.last_error.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_conversions() {
        for state in [
            DriveSessionState::Idle,
            DriveSessionState::Starting,
            DriveSessionState::Active,
            DriveSessionState::Stopping,
        ] {
            assert_eq!(DriveSessionState::from_u8(state.as_u8()), state);
        }
        assert_eq!(DriveSessionState::from_u8(200), DriveSessionState::Idle);
    }

    #[test]
    fn test_is_driving() {
        assert!(!DriveSessionState::Idle.is_driving());
        assert!(DriveSessionState::Starting.is_driving());
        assert!(DriveSessionState::Active.is_driving());
        assert!(!DriveSessionState::Stopping.is_driving());
    }

    #[test]
    fn test_drive_status() {
        let status = DriveStatus::new();
        assert_eq!(status.state(), DriveSessionState::Idle);
        assert!(status.last_error().is_none());

        status.set_state(DriveSessionState::Active);
        status.record_error("boom".to_string());
        assert_eq!(status.state(), DriveSessionState::Active);
        assert_eq!(status.last_error().as_deref(), Some("boom"));

        status.clear_error();
        assert!(status.last_error().is_none());
    }
}
