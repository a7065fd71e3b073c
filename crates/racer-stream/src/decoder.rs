//! 流式帧解码器
//!
//! 从任意切分的字节块中提取完整 JPEG 图像。网络层不知道帧边界，
//! 一个块里可能有半帧、一帧或多帧。
//!
//! # 算法
//!
//! 每次 `feed` 追加块后循环：
//! 1. 查找 SOI `FF D8`，找不到则停止
//! 2. 从 SOI 之后查找 EOI `FF D9`，找不到则停止（保留未完成的帧）
//! 3. 切出 `SOI..=EOI` 交给 [`FrameDecoder`]；成功则输出，失败则静默丢弃
//! 4. 丢弃缓冲区中直到 EOI（含）的全部字节，继续循环
//!
//! 处理完成后若缓冲区超过上限（默认 5 MB）则整体清空：这是内存保护，不是错误。
//!
//! **注意**：这里扫描的是原始 JPEG 标记，而不是 multipart 边界。

use std::sync::Arc;
use std::sync::atomic::Ordering;

use racer_protocol::{FRAME_BUFFER_CAP, JPEG_EOI, JPEG_SOI};
use tracing::{debug, trace};

use crate::frame::{FrameDecoder, JpegFrameDecoder};
use crate::stats::DecoderStats;

/// 流式帧解码器
///
/// # 不变量
///
/// `feed` 返回后缓冲区长度总是 ≤ 上限。
///
/// # 示例
///
/// ```rust
/// use racer_stream::{FrameDecodeError, FrameDecoder, StreamFrameDecoder};
///
/// struct Passthrough;
///
/// impl FrameDecoder for Passthrough {
///     type Output = Vec<u8>;
///
///     fn decode(&mut self, jpeg: &[u8]) -> Result<Vec<u8>, FrameDecodeError> {
///         Ok(jpeg.to_vec())
///     }
/// }
///
/// let mut decoder = StreamFrameDecoder::new(Passthrough);
/// assert!(decoder.feed(&[0x00, 0xFF, 0xD8, 0x01]).is_empty());
/// let frames = decoder.feed(&[0x02, 0xFF, 0xD9, 0x03]);
/// assert_eq!(frames, vec![vec![0xFF, 0xD8, 0x01, 0x02, 0xFF, 0xD9]]);
/// assert_eq!(decoder.buffered_len(), 1);
/// ```
pub struct StreamFrameDecoder<D: FrameDecoder = JpegFrameDecoder> {
    buffer: Vec<u8>,
    capacity_limit: usize,
    decoder: D,
    stats: Arc<DecoderStats>,
}

impl StreamFrameDecoder<JpegFrameDecoder> {
    /// 使用默认 JPEG 解码器
    pub fn jpeg() -> Self {
        Self::new(JpegFrameDecoder::new())
    }
}

impl<D: FrameDecoder> StreamFrameDecoder<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            buffer: Vec::new(),
            capacity_limit: FRAME_BUFFER_CAP,
            decoder,
            stats: Arc::new(DecoderStats::new()),
        }
    }

    /// 设置缓冲区上限（字节）
    pub fn with_capacity_limit(mut self, limit: usize) -> Self {
        self.capacity_limit = limit;
        self
    }

    /// 共享统计（不同解码器实例间复用同一组计数）
    pub fn with_stats(mut self, stats: Arc<DecoderStats>) -> Self {
        self.stats = stats;
        self
    }

    pub fn stats(&self) -> &Arc<DecoderStats> {
        &self.stats
    }

    pub fn capacity_limit(&self) -> usize {
        self.capacity_limit
    }

    /// 当前缓冲的字节数
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// 清空缓冲区（重新连接时调用）
    pub fn reset(&mut self) {
        self.buffer.clear();
    }

    /// 喂入一个网络块，返回本次解出的全部帧（按顺序）
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<D::Output> {
        self.stats
            .bytes_received
            .fetch_add(chunk.len() as u64, Ordering::Relaxed);
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        loop {
            let Some(start) = find_marker(&self.buffer, &JPEG_SOI, 0) else {
                break;
            };
            let Some(eoi) = find_marker(&self.buffer, &JPEG_EOI, start + JPEG_SOI.len()) else {
                break;
            };
            let end = eoi + JPEG_EOI.len();

            match self.decoder.decode(&self.buffer[start..end]) {
                Ok(frame) => {
                    self.stats.frames_emitted.fetch_add(1, Ordering::Relaxed);
                    frames.push(frame);
                },
                Err(e) => {
                    self.stats.frames_dropped.fetch_add(1, Ordering::Relaxed);
                    trace!("Dropping undecodable frame ({} bytes): {}", end - start, e);
                },
            }

            self.buffer.drain(..end);
        }

        if self.buffer.len() > self.capacity_limit {
            debug!(
                "Frame buffer exceeded {} bytes ({}), resetting",
                self.capacity_limit,
                self.buffer.len()
            );
            self.buffer.clear();
            self.stats.buffer_resets.fetch_add(1, Ordering::Relaxed);
        }

        frames
    }
}

fn find_marker(haystack: &[u8], marker: &[u8; 2], from: usize) -> Option<usize> {
    haystack
        .get(from..)?
        .windows(marker.len())
        .position(|window| window == marker)
        .map(|pos| pos + from)
}
