//! 视频流命令
//!
//! 打开视频流，把收到的帧保存为 JPEG 文件。

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use racer_sdk::{StreamConfig, VideoFrame};
use tokio::signal;

use super::ConnectArgs;
use crate::modes::oneshot::OneShotMode;
use crate::validation::prepare_output_dir;

/// 视频流命令参数
#[derive(Args, Debug)]
pub struct StreamCommand {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// 保存的帧数
    #[arg(short, long, default_value_t = 10)]
    pub frames: usize,

    /// 输出目录
    #[arg(short, long, default_value = "frames")]
    pub out: PathBuf,

    /// 等待帧的超时（秒）
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

impl StreamCommand {
    pub async fn execute(&self, mode: &OneShotMode) -> Result<()> {
        prepare_output_dir(&self.out)?;
        let mut client = mode.connect(&self.connect).await?;
        let defaults = StreamConfig::default();

        let mut frames = client.subscribe_frames();
        client.start_video().await?;
        println!(
            "🎥 视频流已打开（{}x{}），保存 {} 帧到 {}",
            defaults.width,
            defaults.height,
            self.frames,
            self.out.display()
        );

        let mut saved = 0;
        let timeout = Duration::from_secs(self.timeout);
        while saved < self.frames {
            tokio::select! {
                _ = signal::ctrl_c() => {
                    println!("\n收到退出信号，正在关闭...");
                    break;
                }
                changed = tokio::time::timeout(timeout, frames.changed()) => {
                    match changed {
                        Ok(Ok(())) => {},
                        Ok(Err(_)) => break,
                        Err(_) => {
                            println!("⚠️  {} 秒内没有收到新帧", self.timeout);
                            break;
                        },
                    }
                }
            }

            let frame = frames.borrow_and_update().clone();
            if let Some(frame) = frame {
                let path = write_frame(&self.out, &frame)?;
                saved += 1;
                println!("  [{}/{}] {}", saved, self.frames, path.display());
            }

            if !client.is_video_running() {
                println!("⚠️  设备关闭了视频流");
                break;
            }
        }

        client.stop_video().await;
        client.disconnect().await?;
        println!("✅ 已保存 {} 帧", saved);
        Ok(())
    }
}

/// 帧文件名按序号排列
pub fn frame_path(dir: &Path, sequence: u64) -> PathBuf {
    dir.join(format!("frame_{:06}.jpg", sequence))
}

fn write_frame(dir: &Path, frame: &VideoFrame) -> Result<PathBuf> {
    let path = frame_path(dir, frame.sequence);
    std::fs::write(&path, &frame.jpeg)
        .with_context(|| format!("写入帧失败: {}", path.display()))?;
    Ok(path)
}
