//! 帧类型与单帧解码
//!
//! [`FrameDecoder`] 是解码接缝：流式解码器只负责切出 `SOI..=EOI` 区间，
//! 由具体实现决定如何把这段字节变成输出。默认实现 [`JpegFrameDecoder`]
//! 使用 `image` crate 完整解码。

use std::sync::Arc;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;

/// 单帧解码失败
///
/// 流式解码器从不向外抛出此错误：解码失败的帧被静默丢弃并计数。
#[derive(Error, Debug)]
pub enum FrameDecodeError {
    #[error("Image decode failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Frame is empty")]
    Empty,
}

/// 单帧解码器
pub trait FrameDecoder {
    type Output;

    /// 解码一段完整的 JPEG 字节（含 SOI 与 EOI 标记）
    fn decode(&mut self, jpeg: &[u8]) -> Result<Self::Output, FrameDecodeError>;
}

/// 解码后的视频帧
///
/// Clone 轻量：原始字节与解码图像都是引用计数共享的。
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// 成功解码的帧序号（从 0 开始）
    pub sequence: u64,
    /// 原始 JPEG 字节
    pub jpeg: Bytes,
    /// 解码后的图像
    pub image: Arc<DynamicImage>,
}

impl VideoFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// 默认 JPEG 解码器
#[derive(Debug, Default)]
pub struct JpegFrameDecoder {
    next_sequence: u64,
}

impl JpegFrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameDecoder for JpegFrameDecoder {
    type Output = VideoFrame;

    fn decode(&mut self, jpeg: &[u8]) -> Result<VideoFrame, FrameDecodeError> {
        if jpeg.is_empty() {
            return Err(FrameDecodeError::Empty);
        }
        let image = image::load_from_memory_with_format(jpeg, ImageFormat::Jpeg)?;

        let sequence = self.next_sequence;
        self.next_sequence += 1;

        Ok(VideoFrame {
            sequence,
            jpeg: Bytes::copy_from_slice(jpeg),
            image: Arc::new(image),
        })
    }
}
