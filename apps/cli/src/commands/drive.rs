//! 驾驶命令
//!
//! 以固定的转向角和油门驾驶一段时间，然后把两个输入清零（停车）。
//! Ctrl+C 会提前停车。

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use racer_sdk::{DriveSessionState, RacerClient};
use tokio::signal;
use tracing::warn;

use super::ConnectArgs;
use crate::modes::oneshot::OneShotMode;
use crate::validation::validate_axis;

/// 停车后等待状态回到 Idle 的上限
const STOP_WAIT: Duration = Duration::from_secs(3);

/// 驾驶命令参数
#[derive(Args, Debug)]
pub struct DriveCommand {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// 转向角，-1.0（左）到 1.0（右）
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub angle: f64,

    /// 油门，-1.0（倒车）到 1.0（前进）
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub throttle: f64,

    /// 驾驶时长（毫秒）
    #[arg(long, default_value_t = 1000)]
    pub duration_ms: u64,
}

impl DriveCommand {
    /// 校验输入；两个输入都为零时不会启动电机
    pub fn inputs(&self) -> Result<(f64, f64)> {
        let angle = validate_axis("angle", self.angle)?;
        let throttle = validate_axis("throttle", self.throttle)?;
        if angle == 0.0 && throttle == 0.0 {
            anyhow::bail!("转向角和油门都为 0，小车不会移动");
        }
        Ok((angle, throttle))
    }

    pub async fn execute(&self, mode: &OneShotMode) -> Result<()> {
        let (angle, throttle) = self.inputs()?;
        let mut client = mode.connect(&self.connect).await?;

        println!(
            "🏎️  驾驶 {} ms（angle={:.2}, throttle={:.2}），按 Ctrl+C 提前停车",
            self.duration_ms, angle, throttle
        );
        client.update_steering(angle)?;
        client.update_throttle(throttle)?;

        tokio::select! {
            _ = tokio::time::sleep(Duration::from_millis(self.duration_ms)) => {},
            _ = signal::ctrl_c() => {
                println!("\n收到退出信号，正在停车...");
            }
        }

        client.update_throttle(0.0)?;
        client.update_steering(0.0)?;
        wait_for_idle(&client).await;

        let metrics = client.drive_metrics();
        println!(
            "📊 已发送 {} 条驾驶指令（失败 {}）",
            metrics.ticks_sent, metrics.tick_failures
        );
        if let Some(error) = client.observer().snapshot().drive_error {
            println!("⚠️  {}", error);
        }

        client.disconnect().await?;
        println!("✅ 已停车");
        Ok(())
    }
}

async fn wait_for_idle(client: &RacerClient) {
    let result = tokio::time::timeout(STOP_WAIT, async {
        while client.drive_state() != DriveSessionState::Idle {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await;
    if result.is_err() {
        warn!("Drive loop did not reach idle in {:?}", STOP_WAIT);
    }
}
