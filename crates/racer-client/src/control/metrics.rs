//! 驾驶循环指标

use std::sync::atomic::{AtomicU64, Ordering};

/// 驾驶循环计数（原子计数器）
#[derive(Debug, Default)]
pub struct DriveMetrics {
    /// 成功发送的驾驶指令数
    pub ticks_sent: AtomicU64,
    /// 发送失败的驾驶指令数（失败不会停止循环）
    pub tick_failures: AtomicU64,
    /// 进入 Active 的次数
    pub loops_started: AtomicU64,
    /// 周期任务被取消的次数
    pub loops_cancelled: AtomicU64,
    /// 启动序列失败次数
    pub start_failures: AtomicU64,
    /// 停车指令失败次数
    pub stop_failures: AtomicU64,
}

impl DriveMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DriveMetricsSnapshot {
        DriveMetricsSnapshot {
            ticks_sent: self.ticks_sent.load(Ordering::Relaxed),
            tick_failures: self.tick_failures.load(Ordering::Relaxed),
            loops_started: self.loops_started.load(Ordering::Relaxed),
            loops_cancelled: self.loops_cancelled.load(Ordering::Relaxed),
            start_failures: self.start_failures.load(Ordering::Relaxed),
            stop_failures: self.stop_failures.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DriveMetricsSnapshot {
    pub ticks_sent: u64,
    pub tick_failures: u64,
    pub loops_started: u64,
    pub loops_cancelled: u64,
    pub start_failures: u64,
    pub stop_failures: u64,
}
