//! 输入验证模块

use anyhow::{Context, Result};
use std::path::Path;

/// 验证单个驾驶输入（转向角 / 油门）
///
/// # 错误
/// 值为 NaN、无穷大或超出 [-1, 1] 时返回错误
pub fn validate_axis(name: &str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        anyhow::bail!(
            "{} 无效: {}",
            name,
            if value.is_nan() { "NaN" } else { "无穷大" }
        );
    }
    if !(-1.0..=1.0).contains(&value) {
        anyhow::bail!("{} {:.3} 超出范围 [-1, 1]", name, value);
    }
    Ok(value)
}

/// 准备输出目录（不存在时创建）
///
/// # 错误
/// 路径为空，或路径已存在但不是目录
pub fn prepare_output_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        anyhow::bail!("输出路径为空");
    }
    if path.exists() && !path.is_dir() {
        anyhow::bail!("输出路径不是目录: {}", path.display());
    }
    std::fs::create_dir_all(path)
        .with_context(|| format!("创建输出目录失败: {}", path.display()))
}
