//! 设备 API 指标
//!
//! 原子计数器，可在任意任务中读取，不引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 设备 API 调用计数
#[derive(Debug, Default)]
pub struct ApiMetrics {
    /// 实际发出的请求数
    pub requests_sent: AtomicU64,
    /// 请求未完成（网络错误 / 超时）次数
    pub network_errors: AtomicU64,
    /// 设备返回非 2xx 的次数
    pub device_rejections: AtomicU64,
    /// 检测到会话过期的次数
    pub session_expiries: AtomicU64,
    /// 因缺少 CSRF token 在本地拦截的请求数
    pub local_rejections: AtomicU64,
}

impl ApiMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ApiMetricsSnapshot {
        ApiMetricsSnapshot {
            requests_sent: self.requests_sent.load(Ordering::Relaxed),
            network_errors: self.network_errors.load(Ordering::Relaxed),
            device_rejections: self.device_rejections.load(Ordering::Relaxed),
            session_expiries: self.session_expiries.load(Ordering::Relaxed),
            local_rejections: self.local_rejections.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ApiMetricsSnapshot {
    pub requests_sent: u64,
    pub network_errors: u64,
    pub device_rejections: u64,
    pub session_expiries: u64,
    pub local_rejections: u64,
}

impl ApiMetricsSnapshot {
    /// 失败率（百分比，未发出请求时为 0）
    pub fn failure_rate(&self) -> f64 {
        if self.requests_sent == 0 {
            return 0.0;
        }
        ((self.network_errors + self.device_rejections) as f64 / self.requests_sent as f64) * 100.0
    }
}
