//! # Racer CLI
//!
//! Command-line interface for racer teleoperation.
//!
//! 每个命令独立执行（One-shot）：连接 → 操作 → 断开。
//!
//! ```bash
//! # 保存默认设备
//! racer-cli config set --address 192.168.1.100 --password secret
//!
//! # 以 30% 油门直行 2 秒
//! racer-cli drive --throttle 0.3 --duration-ms 2000
//!
//! # 保存 20 帧视频到 ./frames
//! racer-cli stream --frames 20 --out frames
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod modes;
mod validation;

use commands::{BatteryCommand, ConfigCommand, DriveCommand, LoginCommand, StreamCommand};
use modes::oneshot::OneShotMode;

/// Racer CLI - 小车遥控命令行工具
#[derive(Parser, Debug)]
#[command(name = "racer-cli")]
#[command(about = "Command-line interface for racer teleoperation", long_about = None)]
#[command(version)]
struct Cli {
    /// 配置文件路径（默认 ~/.config/racer/config.toml）
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 登录并显示会话状态
    Login {
        #[command(flatten)]
        args: LoginCommand,
    },

    /// 查询电量
    Battery {
        #[command(flatten)]
        args: BatteryCommand,
    },

    /// 手动驾驶一段时间后停车
    Drive {
        #[command(flatten)]
        args: DriveCommand,
    },

    /// 保存视频帧
    Stream {
        #[command(flatten)]
        args: StreamCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志（RUST_LOG 优先）
    racer_sdk::init_logger("racer_cli=info,racer_client=info")?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Config(cmd) => cmd.execute(cli.config.as_deref()),

        Commands::Login { args } => {
            let mode = OneShotMode::new(cli.config.as_deref())?;
            args.execute(&mode).await
        },

        Commands::Battery { args } => {
            let mode = OneShotMode::new(cli.config.as_deref())?;
            args.execute(&mode).await
        },

        Commands::Drive { args } => {
            let mode = OneShotMode::new(cli.config.as_deref())?;
            args.execute(&mode).await
        },

        Commands::Stream { args } => {
            let mode = OneShotMode::new(cli.config.as_deref())?;
            args.execute(&mode).await
        },
    }
}
