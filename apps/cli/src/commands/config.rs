//! 配置管理命令
//!
//! 配置文件为 TOML：
//!
//! ```toml
//! address = "192.168.1.100"
//! password = "secret"
//! insecure_skip_verify = true
//! ```

use anyhow::{Context, Result};
use clap::Subcommand;
use racer_sdk::DeviceAddress;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("racer");
    path.push("config.toml");
    Ok(path)
}

/// 解析配置文件路径（命令行参数优先）
pub fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => default_config_file(),
    }
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 默认设备地址（host[:port]）
    pub address: Option<String>,

    /// 设备密码
    pub password: Option<String>,

    /// 是否跳过证书校验（设备使用自签名证书，默认跳过）
    pub insecure_skip_verify: Option<bool>,
}

impl CliConfig {
    /// 加载配置；文件不存在时返回默认配置
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    /// 保存配置（自动创建目录）
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("创建配置目录失败")?;
        }

        let body = toml::to_string_pretty(self).context("序列化配置失败")?;
        let content = format!("# Racer CLI Configuration\n\n{}", body);
        fs::write(path, content).context("写入配置文件失败")?;
        Ok(())
    }

    pub fn insecure_skip_verify(&self) -> bool {
        self.insecure_skip_verify.unwrap_or(true)
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项
    Set {
        /// 设备地址（如 192.168.1.100）
        #[arg(short, long)]
        address: Option<String>,

        /// 设备密码
        #[arg(short, long)]
        password: Option<String>,

        /// 是否跳过证书校验
        #[arg(long)]
        insecure: Option<bool>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称（address / password / insecure / all）
        #[arg(default_value = "all")]
        key: String,
    },

    /// 检查配置
    Check,
}

impl ConfigCommand {
    pub fn execute(self, explicit: Option<&Path>) -> Result<()> {
        let path = resolve_config_path(explicit)?;
        match self {
            ConfigCommand::Set {
                address,
                password,
                insecure,
            } => Self::set_(&path, address, password, insecure),

            ConfigCommand::Get { key } => Self::get_(&path, &key),

            ConfigCommand::Check => Self::check_(&path),
        }
    }

    fn set_(
        path: &Path,
        address: Option<String>,
        password: Option<String>,
        insecure: Option<bool>,
    ) -> Result<()> {
        let mut config = CliConfig::load(path)?;

        if let Some(address) = address {
            DeviceAddress::parse(&address)?;
            println!("✅ 设置默认设备: {}", address);
            config.address = Some(address);
        }

        if let Some(password) = password {
            config.password = Some(password);
            println!("✅ 设置设备密码");
        }

        if let Some(insecure) = insecure {
            config.insecure_skip_verify = Some(insecure);
            println!("✅ 设置跳过证书校验: {}", insecure);
        }

        config.save(path)?;
        Ok(())
    }

    fn get_(path: &Path, key: &str) -> Result<()> {
        let config = CliConfig::load(path)?;

        match key {
            "address" => println!("{}", config.address.as_deref().unwrap_or("(未设置)")),

            "password" => println!("{}", mask(config.password.as_deref())),

            "insecure" => println!("{}", config.insecure_skip_verify()),

            _ => {
                println!("Racer CLI 配置:");
                println!("  设备: {}", config.address.as_deref().unwrap_or("(未设置)"));
                println!("  密码: {}", mask(config.password.as_deref()));
                println!("  跳过证书校验: {}", config.insecure_skip_verify());
            },
        }

        Ok(())
    }

    fn check_(path: &Path) -> Result<()> {
        let config = CliConfig::load(path)?;

        println!("配置文件: {}", path.display());
        match config.address.as_deref() {
            Some(address) => match DeviceAddress::parse(address) {
                Ok(_) => println!("  ✅ 设备: {}", address),
                Err(e) => println!("  ❌ 设备地址无效: {}", e),
            },
            None => println!("  ⚠️  未设置设备地址"),
        }
        if config.password.is_some() {
            println!("  ✅ 已设置密码");
        } else {
            println!("  ⚠️  未设置密码");
        }
        println!("  跳过证书校验: {}", config.insecure_skip_verify());

        Ok(())
    }
}

/// 密码只显示是否已设置
fn mask(password: Option<&str>) -> &'static str {
    match password {
        Some(_) => "***",
        None => "(未设置)",
    }
}
