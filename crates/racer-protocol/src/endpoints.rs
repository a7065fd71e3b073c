//! 设备接口路径定义
//!
//! 所有接口都位于 `https://<address>/` 之下。

use crate::constants::STREAM_TOPIC;

/// 登录页面 / 登录表单提交路径
pub const LOGIN_PATH: &str = "/login";

/// 首页路径（用作 Referer）
pub const HOME_PATH: &str = "/home";

/// 驾驶模式设置
pub const DRIVE_MODE_PATH: &str = "/api/drive_mode";

/// 启动 / 停止
pub const START_STOP_PATH: &str = "/api/start_stop";

/// 手动驾驶指令
pub const MANUAL_DRIVE_PATH: &str = "/api/manual_drive";

/// 电量查询
pub const BATTERY_PATH: &str = "/api/get_battery_level";

/// 视频流路由
pub const STREAM_ROUTE_PATH: &str = "/route";

/// 设备接口枚举
///
/// 路径和"是否需要 CSRF"集中在一处。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// GET /login
    LoginPage,
    /// POST /login
    LoginSubmit,
    /// PUT /api/drive_mode
    DriveMode,
    /// PUT /api/start_stop
    StartStop,
    /// PUT /api/manual_drive
    ManualDrive,
    /// GET /api/get_battery_level
    Battery,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::LoginPage | Endpoint::LoginSubmit => LOGIN_PATH,
            Endpoint::DriveMode => DRIVE_MODE_PATH,
            Endpoint::StartStop => START_STOP_PATH,
            Endpoint::ManualDrive => MANUAL_DRIVE_PATH,
            Endpoint::Battery => BATTERY_PATH,
        }
    }

    /// 是否为需要 CSRF 令牌的变更类请求
    ///
    /// 登录提交使用表单字段携带令牌，不走请求头。
    pub fn is_mutating(self) -> bool {
        matches!(
            self,
            Endpoint::DriveMode | Endpoint::StartStop | Endpoint::ManualDrive
        )
    }
}

/// 构建视频流路径（含查询参数）
///
/// # 示例
///
/// ```rust
/// use racer_protocol::stream_path;
///
/// assert_eq!(
///     stream_path(480, 360),
///     "/route?topic=/display_mjpeg&width=480&height=360"
/// );
/// ```
pub fn stream_path(width: u32, height: u32) -> String {
    format!(
        "{}?topic={}&width={}&height={}",
        STREAM_ROUTE_PATH, STREAM_TOPIC, width, height
    )
}
