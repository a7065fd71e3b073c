//! 命令定义和实现

pub mod battery;
pub mod config;
pub mod drive;
pub mod login;
pub mod stream;

pub use battery::BatteryCommand;
pub use config::ConfigCommand;
pub use drive::DriveCommand;
pub use login::LoginCommand;
pub use stream::StreamCommand;

use clap::Args;

/// 连接参数（覆盖配置文件）
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectArgs {
    /// 设备地址（host[:port]）
    #[arg(short, long)]
    pub address: Option<String>,

    /// 设备密码
    #[arg(short, long)]
    pub password: Option<String>,
}
