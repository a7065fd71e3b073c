//! 控制请求体构建
//!
//! 对应设备的三个变更类接口：
//! - `PUT /api/drive_mode`：`{"drive_mode": "manual"}`
//! - `PUT /api/start_stop`：`{"start_stop": "start" | "stop"}`
//! - `PUT /api/manual_drive`：`{"angle": f, "throttle": f, "max_speed": f}`

use serde::{Deserialize, Serialize};

use crate::constants::MAX_SPEED;

/// 驾驶模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriveMode {
    /// 手动驾驶（遥控）
    Manual,
}

/// 启停动作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartStop {
    Start,
    Stop,
}

/// `PUT /api/drive_mode` 请求体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriveModeRequest {
    pub drive_mode: DriveMode,
}

impl DriveModeRequest {
    pub fn manual() -> Self {
        Self {
            drive_mode: DriveMode::Manual,
        }
    }
}

/// `PUT /api/start_stop` 请求体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartStopRequest {
    pub start_stop: StartStop,
}

impl StartStopRequest {
    pub fn start() -> Self {
        Self {
            start_stop: StartStop::Start,
        }
    }

    pub fn stop() -> Self {
        Self {
            start_stop: StartStop::Stop,
        }
    }
}

/// `PUT /api/manual_drive` 请求体
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualDriveRequest {
    pub angle: f64,
    pub throttle: f64,
    pub max_speed: f64,
}

/// 单次驾驶指令
///
/// 临时值：每个周期根据最新输入重新计算，从不排队，只有最新值有意义。
///
/// **注意**：构造时不做二次限幅，调用方（驾驶控制器）负责把输入限制在 [-1, 1]。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveCommand {
    /// 转向角，-1.0（左）到 1.0（右）
    pub angle: f64,
    /// 油门，-1.0（倒车）到 1.0（前进）
    pub throttle: f64,
    /// 最大速度上限（常量）
    pub max_speed: f64,
}

impl DriveCommand {
    pub fn new(angle: f64, throttle: f64) -> Self {
        Self {
            angle,
            throttle,
            max_speed: MAX_SPEED,
        }
    }

    /// 两个输入通道是否都为零（停车条件）
    pub fn is_neutral(&self) -> bool {
        self.angle == 0.0 && self.throttle == 0.0
    }

    pub fn to_request(self) -> ManualDriveRequest {
        ManualDriveRequest {
            angle: self.angle,
            throttle: self.throttle,
            max_speed: self.max_speed,
        }
    }
}

/// 将单个模拟输入限制到 [-1, 1]
///
/// 非有限值（NaN / ±Inf）按 0 处理，避免把非法值发给设备。
pub fn clamp_axis(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
