//! 协议常量定义

/// 手动驾驶最大速度上限（随每条驾驶指令一起发送）
pub const MAX_SPEED: f64 = 0.5;

/// 驾驶指令发送周期（毫秒），即 20Hz
pub const DRIVE_TICK_PERIOD_MS: u64 = 50;

/// 启动序列中 `start` 之后的稳定等待时间（毫秒）
pub const START_SETTLE_DELAY_MS: u64 = 100;

/// 电量轮询间隔（秒）
pub const BATTERY_POLL_INTERVAL_SECS: u64 = 5;

/// 电量未知时的哨兵值（区别于 0%）
pub const BATTERY_LEVEL_UNKNOWN: i32 = -1;

/// 视频流缓冲区容量上限（字节）
///
/// 超过此值时整体清空缓冲区（失步恢复），而不是继续扫描。
pub const FRAME_BUFFER_CAP: usize = 5_000_000;

/// 默认视频流宽度（像素）
pub const DEFAULT_STREAM_WIDTH: u32 = 480;

/// 默认视频流高度（像素）
pub const DEFAULT_STREAM_HEIGHT: u32 = 360;

/// 视频流话题
pub const STREAM_TOPIC: &str = "/display_mjpeg";

/// JPEG 起始标记（SOI）
pub const JPEG_SOI: [u8; 2] = [0xFF, 0xD8];

/// JPEG 结束标记（EOI）
pub const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];

/// CSRF 请求头名称
pub const CSRF_HEADER: &str = "X-CSRFToken";

/// 登录表单 Content-Type
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";

/// 登录表单中的 CSRF 字段名
pub const CSRF_FORM_FIELD: &str = "csrf_token";

/// 登录表单中的密码字段名
pub const PASSWORD_FORM_FIELD: &str = "password";
