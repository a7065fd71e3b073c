//! 帧回调钩子
//!
//! 视频读取任务每解出一帧就触发一次所有已注册的回调。
//!
//! # 设计原则
//!
//! - **非阻塞**: 回调运行在读取任务上，必须立即返回，推荐通过 Channel 转交
//! - **有界队列**: [`ChannelFrameHook`] 使用 `bounded` 通道，队列满时丢帧而非阻塞
//!
//! # 使用示例
//!
//! ```rust
//! use racer_stream::hooks::{ChannelFrameHook, FrameCallback, HookManager};
//! use std::sync::Arc;
//!
//! let mut hooks = HookManager::new();
//! let (hook, rx) = ChannelFrameHook::new(8);
//! hooks.add_callback(Arc::new(hook) as Arc<dyn FrameCallback>);
//!
//! // 在另一个线程消费帧
//! std::thread::spawn(move || {
//!     while let Ok(frame) = rx.recv() {
//!         let _ = frame.jpeg.len();
//!     }
//! });
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::frame::VideoFrame;

/// 帧回调 Trait
///
/// # 性能要求
///
/// - 禁止阻塞操作（I/O、长时间持锁）
/// - 推荐使用 `try_send` 而非 `send`
pub trait FrameCallback: Send + Sync {
    /// 解出新帧时调用
    fn on_frame(&self, frame: &VideoFrame);

    /// 视频流结束或 `MjpegStreamer::stop` 时调用（可选）
    fn on_stream_end(&self) {}
}

/// 钩子管理器
///
/// 回调列表本身不是线程安全的，需要外部同步（通常通过 `RwLock<HookManager>`）。
#[derive(Default)]
pub struct HookManager {
    callbacks: Vec<Arc<dyn FrameCallback>>,
}

impl HookManager {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            callbacks: Vec::new(),
        }
    }

    pub fn add_callback(&mut self, callback: Arc<dyn FrameCallback>) {
        self.callbacks.push(callback);
    }

    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    pub fn trigger_all(&self, frame: &VideoFrame) {
        for callback in self.callbacks.iter() {
            callback.on_frame(frame);
        }
    }

    pub fn trigger_stream_end(&self) {
        for callback in self.callbacks.iter() {
            callback.on_stream_end();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

/// 基于有界通道的帧钩子
///
/// 队列满时丢弃新帧并计数，视频消费慢不会拖慢读取任务。
pub struct ChannelFrameHook {
    tx: Sender<VideoFrame>,
    delivered: Arc<AtomicU64>,
    dropped: Arc<AtomicU64>,
}

impl ChannelFrameHook {
    /// 创建钩子与接收端
    ///
    /// # 参数
    ///
    /// - `capacity`: 队列容量（帧）
    #[must_use]
    pub fn new(capacity: usize) -> (Self, Receiver<VideoFrame>) {
        let (tx, rx) = bounded(capacity);
        let hook = Self {
            tx,
            delivered: Arc::new(AtomicU64::new(0)),
            dropped: Arc::new(AtomicU64::new(0)),
        };
        (hook, rx)
    }

    /// 已投递的帧数
    pub fn delivered(&self) -> &Arc<AtomicU64> {
        &self.delivered
    }

    /// 因队列满或接收端关闭而丢弃的帧数
    pub fn dropped(&self) -> &Arc<AtomicU64> {
        &self.dropped
    }
}

impl FrameCallback for ChannelFrameHook {
    fn on_frame(&self, frame: &VideoFrame) {
        match self.tx.try_send(frame.clone()) {
            Ok(()) => {
                self.delivered.fetch_add(1, Ordering::Relaxed);
            },
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{FrameDecoder, JpegFrameDecoder, test_util::encode_jpeg};
    use std::sync::atomic::AtomicBool;

    fn sample_frame() -> VideoFrame {
        JpegFrameDecoder::new()
            .decode(&encode_jpeg(8, 8, 7))
            .unwrap()
    }

    struct EndFlag(AtomicBool);

    impl FrameCallback for EndFlag {
        fn on_frame(&self, _frame: &VideoFrame) {}

        fn on_stream_end(&self) {
            self.0.store(true, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_hook_manager_add_and_clear() {
        let mut hooks = HookManager::new();
        assert!(hooks.is_empty());

        let (hook, _rx) = ChannelFrameHook::new(4);
        hooks.add_callback(Arc::new(hook));
        assert_eq!(hooks.len(), 1);

        hooks.clear();
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_channel_hook_delivers_frames() {
        let mut hooks = HookManager::new();
        let (hook, rx) = ChannelFrameHook::new(4);
        let delivered = hook.delivered().clone();
        hooks.add_callback(Arc::new(hook));

        let frame = sample_frame();
        hooks.trigger_all(&frame);

        let received = rx.try_recv().unwrap();
        assert_eq!(received.sequence, frame.sequence);
        assert_eq!(delivered.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_channel_hook_drops_when_full() {
        let (hook, rx) = ChannelFrameHook::new(1);
        let frame = sample_frame();

        hook.on_frame(&frame);
        hook.on_frame(&frame);
        hook.on_frame(&frame);

        assert_eq!(hook.delivered().load(Ordering::Relaxed), 1);
        assert_eq!(hook.dropped().load(Ordering::Relaxed), 2);
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn test_stream_end_notification() {
        let mut hooks = HookManager::new();
        let flag = Arc::new(EndFlag(AtomicBool::new(false)));
        hooks.add_callback(flag.clone());

        hooks.trigger_stream_end();
        assert!(flag.0.load(Ordering::Relaxed));
    }
}
