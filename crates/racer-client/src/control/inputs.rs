//! 最新的转向/油门输入
//!
//! 两个标量以 `f64` 位模式存放在 `AtomicU64` 中：控制器写，周期任务在每个
//! tick 读取最新值。

use std::sync::atomic::{AtomicU64, Ordering};

use racer_protocol::{DriveCommand, clamp_axis};

/// 最新输入（值已限制在 [-1, 1]）
#[derive(Debug, Default)]
pub struct DriveInputs {
    angle: AtomicU64,
    throttle: AtomicU64,
}

impl DriveInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn angle(&self) -> f64 {
        f64::from_bits(self.angle.load(Ordering::Acquire))
    }

    pub fn throttle(&self) -> f64 {
        f64::from_bits(self.throttle.load(Ordering::Acquire))
    }

    /// 两个输入是否都为零
    pub fn is_neutral(&self) -> bool {
        self.angle() == 0.0 && self.throttle() == 0.0
    }

    /// 根据当前输入构造驾驶指令
    pub fn command(&self, max_speed: f64) -> DriveCommand {
        DriveCommand {
            angle: self.angle(),
            throttle: self.throttle(),
            max_speed,
        }
    }

    /// 写入转向角，返回限幅后的值
    pub(crate) fn set_angle(&self, angle: f64) -> f64 {
        let angle = clamp_axis(angle);
        self.angle.store(angle.to_bits(), Ordering::Release);
        angle
    }

    /// 写入油门，返回限幅后的值
    pub(crate) fn set_throttle(&self, throttle: f64) -> f64 {
        let throttle = clamp_axis(throttle);
        self.throttle.store(throttle.to_bits(), Ordering::Release);
        throttle
    }

    pub(crate) fn clear(&self) {
        self.set_angle(0.0);
        self.set_throttle(0.0);
    }
}
