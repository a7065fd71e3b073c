//! 可观察状态
//!
//! UI 层只读访问：认证状态、最近错误、电量、驾驶状态。

use std::sync::Arc;

use racer_driver::DeviceApiClient;
use racer_protocol::{BatteryBand, BatteryState};

use crate::control::{DriveSessionState, DriveStatus};

/// 客户端状态快照
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    pub authenticated: bool,
    /// 会话最近一次错误（登录失败、会话过期）
    pub last_error: Option<String>,
    pub battery: BatteryState,
    pub drive_state: DriveSessionState,
    /// 最近一次驾驶错误（启动失败、停车失败）
    pub drive_error: Option<String>,
}

impl ClientSnapshot {
    /// 电机已启动或正在启动
    pub fn driving(&self) -> bool {
        self.drive_state.is_driving()
    }

    pub fn battery_band(&self) -> BatteryBand {
        self.battery.band()
    }
}

/// 状态观察器（Clone 轻量）
#[derive(Debug, Clone)]
pub struct Observer {
    api: DeviceApiClient,
    drive: Arc<DriveStatus>,
}

impl Observer {
    pub(crate) fn new(api: DeviceApiClient, drive: Arc<DriveStatus>) -> Self {
        Self { api, drive }
    }

    pub fn snapshot(&self) -> ClientSnapshot {
        let session = self.api.session().snapshot();
        ClientSnapshot {
            authenticated: session.authenticated,
            last_error: session.last_error,
            battery: self.api.battery(),
            drive_state: self.drive.state(),
            drive_error: self.drive.last_error(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.api.session().is_authenticated()
    }

    pub fn battery(&self) -> BatteryState {
        self.api.battery()
    }

    pub fn drive_state(&self) -> DriveSessionState {
        self.drive.state()
    }
}
