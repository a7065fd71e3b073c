//! # Racer Stream
//!
//! MJPEG 视频流处理：
//! - `decoder`: 从任意切分的字节块中提取完整 JPEG（有界缓冲）
//! - `frame`: 单帧解码接缝与默认 JPEG 解码器
//! - `hooks`: 帧回调（有界通道转交）
//! - `streamer`: 设备视频流读取任务
//! - `stats`: 解码统计

mod decoder;
pub mod frame;
pub mod hooks;
pub mod stats;
pub mod streamer;

pub use decoder::StreamFrameDecoder;
pub use frame::{FrameDecodeError, FrameDecoder, JpegFrameDecoder, VideoFrame};
pub use hooks::{ChannelFrameHook, FrameCallback, HookManager};
pub use stats::{DecoderStats, DecoderStatsSnapshot};
pub use streamer::{MjpegStreamer, StreamConfig, StreamError};
