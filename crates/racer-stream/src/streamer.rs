//! MJPEG 视频流读取
//!
//! 打开 `GET /route?topic=/display_mjpeg&width=W&height=H`，在后台任务中把每个
//! 网络块喂给 [`StreamFrameDecoder`]，解出的帧发布到：
//! - "最新帧"槽（`tokio::sync::watch`），展示层只关心最新一帧
//! - 已注册的 [`FrameCallback`] 钩子
//!
//! 解码（CPU 密集）在 `spawn_blocking` 中执行，不阻塞其他异步任务。

use std::sync::Arc;

use futures::StreamExt;
use parking_lot::RwLock;
use racer_protocol::{DEFAULT_STREAM_HEIGHT, DEFAULT_STREAM_WIDTH, FRAME_BUFFER_CAP, stream_path};
use racer_transport::{ByteStream, HttpTransport, TransportError};
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::decoder::StreamFrameDecoder;
use crate::frame::VideoFrame;
use crate::hooks::{FrameCallback, HookManager};
use crate::stats::{DecoderStats, DecoderStatsSnapshot};

/// 视频流错误
#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Failed to open video stream: {0}")]
    Transport(#[from] TransportError),

    #[error("Video stream is already running")]
    AlreadyRunning,
}

/// 视频流配置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConfig {
    pub width: u32,
    pub height: u32,
    /// 帧缓冲区上限（字节）
    pub buffer_cap: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_STREAM_WIDTH,
            height: DEFAULT_STREAM_HEIGHT,
            buffer_cap: FRAME_BUFFER_CAP,
        }
    }
}

impl StreamConfig {
    pub fn path(&self) -> String {
        stream_path(self.width, self.height)
    }
}

struct ReaderHandle {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

/// MJPEG 视频流
///
/// 同一时刻最多一个读取任务。
pub struct MjpegStreamer {
    transport: HttpTransport,
    config: StreamConfig,
    hooks: Arc<RwLock<HookManager>>,
    latest: Arc<watch::Sender<Option<VideoFrame>>>,
    stats: Arc<DecoderStats>,
    reader: Option<ReaderHandle>,
}

impl MjpegStreamer {
    pub fn new(transport: HttpTransport, config: StreamConfig) -> Self {
        let (latest, _) = watch::channel(None);
        Self {
            transport,
            config,
            hooks: Arc::new(RwLock::new(HookManager::new())),
            latest: Arc::new(latest),
            stats: Arc::new(DecoderStats::new()),
            reader: None,
        }
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// 注册帧回调（运行中注册也会立即生效）
    pub fn add_callback(&self, callback: Arc<dyn FrameCallback>) {
        self.hooks.write().add_callback(callback);
    }

    /// 订阅最新帧
    pub fn subscribe(&self) -> watch::Receiver<Option<VideoFrame>> {
        self.latest.subscribe()
    }

    pub fn latest_frame(&self) -> Option<VideoFrame> {
        self.latest.borrow().clone()
    }

    pub fn stats(&self) -> DecoderStatsSnapshot {
        self.stats.snapshot()
    }

    /// 读取任务是否仍在运行（流被设备关闭后返回 false）
    pub fn is_running(&self) -> bool {
        self.reader
            .as_ref()
            .is_some_and(|reader| !reader.handle.is_finished())
    }

    /// 打开视频流并启动读取任务
    ///
    /// # 错误
    /// - `StreamError::AlreadyRunning`: 已有读取任务在运行
    /// - `StreamError::Transport`: 请求失败或返回非 2xx
    pub async fn start(&mut self) -> Result<(), StreamError> {
        if self.is_running() {
            return Err(StreamError::AlreadyRunning);
        }
        // 上一个任务已自行结束，回收句柄
        if let Some(reader) = self.reader.take() {
            let _ = reader.handle.await;
        }

        let referer = self.transport.home_url();
        let path = self.config.path();
        let stream = self
            .transport
            .open_stream(&path, &[("Referer", referer.as_str())])
            .await?;

        info!(
            "Video stream started ({}x{})",
            self.config.width, self.config.height
        );

        let decoder = StreamFrameDecoder::jpeg()
            .with_capacity_limit(self.config.buffer_cap)
            .with_stats(self.stats.clone());
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(read_loop(
            stream,
            decoder,
            self.latest.clone(),
            self.hooks.clone(),
            shutdown_rx,
        ));

        self.reader = Some(ReaderHandle {
            shutdown: shutdown_tx,
            handle,
        });
        Ok(())
    }

    /// 停止读取任务并清空最新帧
    ///
    /// 等待读取任务退出后才返回。
    pub async fn stop(&mut self) {
        if let Some(reader) = self.reader.take() {
            let _ = reader.shutdown.send(());
            if let Err(e) = reader.handle.await {
                warn!("Video reader task failed: {}", e);
            }
            info!("Video stream stopped");
        }
        self.latest.send_replace(None);
    }
}

impl Drop for MjpegStreamer {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            let _ = reader.shutdown.send(());
            reader.handle.abort();
        }
    }
}

async fn read_loop(
    mut stream: ByteStream,
    mut decoder: StreamFrameDecoder,
    latest: Arc<watch::Sender<Option<VideoFrame>>>,
    hooks: Arc<RwLock<HookManager>>,
    mut shutdown: oneshot::Receiver<()>,
) {
    loop {
        let chunk = tokio::select! {
            _ = &mut shutdown => {
                debug!("Video reader cancelled");
                break;
            }
            chunk = stream.next() => chunk,
        };

        let chunk = match chunk {
            Some(Ok(chunk)) => chunk,
            Some(Err(e)) => {
                warn!("Video stream read failed: {}", e);
                break;
            },
            None => {
                info!("Video stream ended by device");
                break;
            },
        };

        let decoded = tokio::task::spawn_blocking(move || {
            let frames = decoder.feed(&chunk);
            (decoder, frames)
        })
        .await;
        let frames = match decoded {
            Ok((returned, frames)) => {
                decoder = returned;
                frames
            },
            Err(e) => {
                warn!("Frame decoding task failed: {}", e);
                break;
            },
        };

        for frame in frames {
            hooks.read().trigger_all(&frame);
            latest.send_replace(Some(frame));
        }
    }

    hooks.read().trigger_stream_end();
}
