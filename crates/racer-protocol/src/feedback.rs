//! 反馈解析
//!
//! 电量接口不受传输层认证保护：会话失效后设备返回登录页 HTML 而不是 JSON。
//! 因此解析前必须先嗅探 HTML 特征（见 [`looks_like_html`]）。

use serde::{Deserialize, Serialize};

use crate::ProtocolError;
use crate::constants::BATTERY_LEVEL_UNKNOWN;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// `GET /api/get_battery_level` 响应体
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatteryResponse {
    pub battery_level: i32,
    pub success: bool,
}

impl BatteryResponse {
    /// 解析响应体
    ///
    /// # 错误
    /// - `ProtocolError::UnexpectedHtml`: 响应体是 HTML 文档（会话过期）
    /// - `ProtocolError::Json`: 其他无法解析的内容
    pub fn parse(body: &[u8]) -> Result<Self, ProtocolError> {
        if looks_like_html(body) {
            return Err(ProtocolError::UnexpectedHtml);
        }
        Ok(serde_json::from_slice(body)?)
    }
}

/// 电量状态
///
/// "未知"是独立的哨兵值，区别于 0%。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatteryState {
    pub level: i32,
    pub known: bool,
}

impl BatteryState {
    pub const fn unknown() -> Self {
        Self {
            level: BATTERY_LEVEL_UNKNOWN,
            known: false,
        }
    }

    pub const fn known(level: i32) -> Self {
        Self { level, known: true }
    }

    /// 由设备响应得出状态；`success == false` 视为未知
    pub fn from_response(response: &BatteryResponse) -> Self {
        if response.success {
            Self::known(response.battery_level)
        } else {
            Self::unknown()
        }
    }

    pub fn band(&self) -> BatteryBand {
        BatteryBand::classify(*self)
    }
}

impl Default for BatteryState {
    fn default() -> Self {
        Self::unknown()
    }
}

/// 电量区间分级（用于展示层着色）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryBand {
    /// > 50
    Healthy,
    /// (20, 50]
    Low,
    /// <= 20
    Critical,
    Unknown,
}

impl BatteryBand {
    pub fn classify(state: BatteryState) -> Self {
        if !state.known {
            return BatteryBand::Unknown;
        }
        match state.level {
            l if l > 50 => BatteryBand::Healthy,
            l if l > 20 => BatteryBand::Low,
            _ => BatteryBand::Critical,
        }
    }
}

/// 嗅探响应体是否为 HTML 文档
///
/// 忽略 UTF-8 BOM 与前导空白，大小写不敏感地匹配 `<!DOCTYPE html` 或 `<html`。
/// 同时兼容文档中间出现 `<html` 的情况（部分登录页前面带注释）。
pub fn looks_like_html(body: &[u8]) -> bool {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);
    let start = body
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(body.len());
    let head = &body[start..];

    if starts_with_ignore_case(head, b"<!doctype html") || starts_with_ignore_case(head, b"<html")
    {
        return true;
    }

    // JSON 文档不会以 '<' 开头；只有以 '<' 开头时才继续深扫
    head.first() == Some(&b'<') && contains_ignore_case(head, b"<html")
}

fn starts_with_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.len() >= needle.len() && haystack[..needle.len()].eq_ignore_ascii_case(needle)
}

fn contains_ignore_case(haystack: &[u8], needle: &[u8]) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window.eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_battery_response() {
        let body = br#"{"battery_level": 9, "success": true}"#;
        let response = BatteryResponse::parse(body).unwrap();
        assert_eq!(response.battery_level, 9);
        assert!(response.success);
    }

    #[test]
    fn test_parse_html_is_rejected_before_json() {
        let body = b"<!DOCTYPE html><html><body>login</body></html>";
        assert!(matches!(
            BatteryResponse::parse(body),
            Err(ProtocolError::UnexpectedHtml)
        ));
    }

    #[test]
    fn test_parse_garbage_is_json_error() {
        assert!(matches!(
            BatteryResponse::parse(b"not json"),
            Err(ProtocolError::Json(_))
        ));
    }

    #[test]
    fn test_looks_like_html_variants() {
        assert!(looks_like_html(b"<!DOCTYPE html>"));
        assert!(looks_like_html(b"  \n<!doctype HTML>"));
        assert!(looks_like_html(b"<html lang=\"en\">"));
        assert!(looks_like_html(b"<!-- login --><html>"));
        assert!(!looks_like_html(br#"{"battery_level": 5, "success": true}"#));
        assert!(!looks_like_html(b""));
    }

    #[test]
    fn test_html_with_utf8_bom() {
        let body = b"\xEF\xBB\xBF<!DOCTYPE html><html><body>login</body></html>";
        assert!(looks_like_html(body));
        assert!(looks_like_html(b"\xEF\xBB\xBF\r\n<html>"));
        assert!(matches!(
            BatteryResponse::parse(body),
            Err(ProtocolError::UnexpectedHtml)
        ));
        assert!(!looks_like_html(b"\xEF\xBB\xBF{\"battery_level\": 5}"));
    }

    #[test]
    fn test_battery_state_unknown_is_not_zero() {
        let unknown = BatteryState::unknown();
        let empty = BatteryState::known(0);
        assert_ne!(unknown, empty);
        assert_eq!(unknown.level, BATTERY_LEVEL_UNKNOWN);
        assert!(!unknown.known);
    }

    #[test]
    fn test_battery_state_from_unsuccessful_response() {
        let response = BatteryResponse {
            battery_level: 7,
            success: false,
        };
        assert_eq!(BatteryState::from_response(&response), BatteryState::unknown());
    }

    #[test]
    fn test_battery_band_thresholds() {
        assert_eq!(BatteryState::known(85).band(), BatteryBand::Healthy);
        assert_eq!(BatteryState::known(51).band(), BatteryBand::Healthy);
        assert_eq!(BatteryState::known(50).band(), BatteryBand::Low);
        assert_eq!(BatteryState::known(21).band(), BatteryBand::Low);
        assert_eq!(BatteryState::known(20).band(), BatteryBand::Critical);
        assert_eq!(BatteryState::known(0).band(), BatteryBand::Critical);
        assert_eq!(BatteryState::unknown().band(), BatteryBand::Unknown);
    }
}
