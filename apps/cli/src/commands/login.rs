//! 登录命令
//!
//! 完成登录握手后显示会话状态，然后断开。

use anyhow::Result;
use clap::Args;

use super::ConnectArgs;
use crate::modes::oneshot::{OneShotMode, describe_battery};

/// 登录命令参数
#[derive(Args, Debug)]
pub struct LoginCommand {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

impl LoginCommand {
    pub async fn execute(&self, mode: &OneShotMode) -> Result<()> {
        let mut client = mode.connect(&self.connect).await?;

        let snapshot = client.observer().snapshot();
        println!("会话状态:");
        println!("  已认证: {}", snapshot.authenticated);
        let token = if client.session().csrf_token().is_some() {
            "已获取"
        } else {
            "无"
        };
        println!("  CSRF token: {}", token);
        println!("  电量: {}", describe_battery(snapshot.battery));

        client.disconnect().await?;
        Ok(())
    }
}
