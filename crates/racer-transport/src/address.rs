//! 设备地址
//!
//! 设备地址只包含 `host[:port]`，协议（scheme）由 [`TransportConfig`](crate::TransportConfig) 决定。

use std::fmt;

use url::Url;

use crate::TransportError;

/// 已校验的设备地址（`host[:port]`）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceAddress {
    authority: String,
}

impl DeviceAddress {
    /// 解析并校验设备地址
    ///
    /// # 错误
    /// - `TransportError::InvalidAddress`: 为空、带协议、带路径/查询、或主机名非法
    ///
    /// # 示例
    ///
    /// ```rust
    /// use racer_transport::DeviceAddress;
    ///
    /// let addr = DeviceAddress::parse("192.168.7.196").unwrap();
    /// assert_eq!(addr.as_str(), "192.168.7.196");
    ///
    /// assert!(DeviceAddress::parse("https://192.168.7.196").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, TransportError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TransportError::InvalidAddress(input.to_string()));
        }
        if trimmed.contains("://")
            || trimmed.contains('/')
            || trimmed.contains('?')
            || trimmed.contains('#')
            || trimmed.contains('@')
        {
            return Err(TransportError::InvalidAddress(input.to_string()));
        }

        // 借用 URL 解析器校验主机名与端口
        let url = Url::parse(&format!("https://{}/", trimmed))
            .map_err(|_| TransportError::InvalidAddress(input.to_string()))?;
        if url.host().is_none() {
            return Err(TransportError::InvalidAddress(input.to_string()));
        }

        Ok(Self {
            authority: trimmed.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.authority
    }
}

impl fmt::Display for DeviceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.authority)
    }
}

impl std::str::FromStr for DeviceAddress {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip() {
        let addr = DeviceAddress::parse("192.168.1.100").unwrap();
        assert_eq!(addr.as_str(), "192.168.1.100");
        assert_eq!(addr.to_string(), "192.168.1.100");
    }

    #[test]
    fn test_parse_host_with_port() {
        let addr = DeviceAddress::parse("deepracer.local:8443").unwrap();
        assert_eq!(addr.as_str(), "deepracer.local:8443");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let addr = DeviceAddress::parse("  10.0.0.2 \n").unwrap();
        assert_eq!(addr.as_str(), "10.0.0.2");
    }

    #[test]
    fn test_parse_rejects_invalid() {
        for input in [
            "",
            "   ",
            "https://10.0.0.2",
            "10.0.0.2/login",
            "10.0.0.2?x=1",
            "user@10.0.0.2",
            "10.0.0.2:notaport",
        ] {
            assert!(
                DeviceAddress::parse(input).is_err(),
                "expected {:?} to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_from_str() {
        let addr: DeviceAddress = "127.0.0.1:8080".parse().unwrap();
        assert_eq!(addr.as_str(), "127.0.0.1:8080");
    }
}
