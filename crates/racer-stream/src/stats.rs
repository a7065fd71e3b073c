//! 解码器统计

use std::sync::atomic::{AtomicU64, Ordering};

/// 流式解码统计（原子计数，可跨任务读取）
#[derive(Debug, Default)]
pub struct DecoderStats {
    /// 收到的字节总数
    pub bytes_received: AtomicU64,
    /// 成功解码并输出的帧数
    pub frames_emitted: AtomicU64,
    /// 找到完整标记但解码失败而丢弃的帧数
    pub frames_dropped: AtomicU64,
    /// 缓冲区超过上限被清空的次数
    pub buffer_resets: AtomicU64,
}

impl DecoderStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> DecoderStatsSnapshot {
        DecoderStatsSnapshot {
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            frames_emitted: self.frames_emitted.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            buffer_resets: self.buffer_resets.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecoderStatsSnapshot {
    pub bytes_received: u64,
    pub frames_emitted: u64,
    pub frames_dropped: u64,
    pub buffer_resets: u64,
}

impl DecoderStatsSnapshot {
    /// 解码成功率（百分比，无帧时为 100）
    pub fn success_rate(&self) -> f64 {
        let total = self.frames_emitted + self.frames_dropped;
        if total == 0 {
            return 100.0;
        }
        (self.frames_emitted as f64 / total as f64) * 100.0
    }
}
