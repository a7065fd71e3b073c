//! 电量查询命令

use std::time::Duration;

use anyhow::Result;
use clap::Args;
use racer_sdk::BatteryOutcome;
use tokio::signal;

use super::ConnectArgs;
use crate::modes::oneshot::{OneShotMode, describe_battery};

/// 电量查询参数
#[derive(Args, Debug)]
pub struct BatteryCommand {
    #[command(flatten)]
    pub connect: ConnectArgs,

    /// 持续查询的间隔（秒），0 表示只查询一次
    #[arg(short, long, default_value_t = 0)]
    pub watch: u64,
}

impl BatteryCommand {
    pub async fn execute(&self, mode: &OneShotMode) -> Result<()> {
        let mut client = mode.connect(&self.connect).await?;
        println!("🔋 电量: {}", describe_battery(client.battery()));

        if self.watch > 0 {
            println!("按 Ctrl+C 停止\n");
            let mut ticker = tokio::time::interval(Duration::from_secs(self.watch));
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = signal::ctrl_c() => {
                        println!("\n收到退出信号，正在关闭...");
                        break;
                    }
                    _ = ticker.tick() => {},
                }

                match client.fetch_battery().await {
                    Ok(BatteryOutcome::Level(state)) => {
                        println!("🔋 电量: {}", describe_battery(state));
                    },
                    Ok(BatteryOutcome::Expired) => {
                        println!("⚠️  会话已过期，重新登录...");
                        client.reauthenticate().await?;
                    },
                    Err(e) => println!("❌ 查询失败: {}", e),
                }
            }
        }

        client.disconnect().await?;
        Ok(())
    }
}
