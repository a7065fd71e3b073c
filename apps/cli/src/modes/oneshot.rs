//! One-shot 模式
//!
//! 每个命令独立执行：
//! 1. 读取配置
//! 2. 连接设备（登录 + 电量确认）
//! 3. 执行操作
//! 4. 断开连接

use std::path::Path;

use anyhow::{Context, Result};
use racer_sdk::prelude::*;

use crate::commands::ConnectArgs;
use crate::commands::config::{CliConfig, resolve_config_path};

/// 连接目标（参数与配置合并后的结果）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    pub address: String,
    pub password: String,
    pub insecure_skip_verify: bool,
}

/// One-shot 模式
pub struct OneShotMode {
    config: CliConfig,
}

impl OneShotMode {
    /// 加载配置文件创建实例
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let path = resolve_config_path(config_path)?;
        let config = CliConfig::load(&path)?;
        Ok(Self { config })
    }

    #[cfg(test)]
    pub fn with_config(config: CliConfig) -> Self {
        Self { config }
    }

    /// 合并命令行参数与配置（命令行参数优先）
    pub fn resolve(&self, args: &ConnectArgs) -> Result<ConnectTarget> {
        let address = args
            .address
            .clone()
            .or_else(|| self.config.address.clone())
            .context("未指定设备地址，请使用 --address 或 `racer-cli config set --address`")?;
        let password = args
            .password
            .clone()
            .or_else(|| self.config.password.clone())
            .context("未指定设备密码，请使用 --password 或 `racer-cli config set --password`")?;

        Ok(ConnectTarget {
            address,
            password,
            insecure_skip_verify: self.config.insecure_skip_verify(),
        })
    }

    /// 连接设备
    pub async fn connect(&self, args: &ConnectArgs) -> Result<RacerClient> {
        let target = self.resolve(args)?;

        println!("⏳ 连接到 {}...", target.address);
        let mut config = ClientConfig::default();
        config.transport = config
            .transport
            .with_insecure_skip_verify(target.insecure_skip_verify);

        let client = RacerClient::connect(
            &target.address,
            Credential::new(target.password),
            config,
        )
        .await
        .with_context(|| format!("连接 {} 失败", target.address))?;

        println!("✅ 已连接");
        Ok(client)
    }
}

/// 电量的可读形式
pub fn describe_battery(state: BatteryState) -> String {
    match state.band() {
        BatteryBand::Unknown => "未知".to_string(),
        BatteryBand::Healthy => format!("{}% 🟢", state.level),
        BatteryBand::Low => format!("{}% 🟡", state.level),
        BatteryBand::Critical => format!("{}% 🔴", state.level),
    }
}
