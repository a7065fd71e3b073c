//! 驾驶状态机
//!
//! 由 `update_steering` / `update_throttle` 驱动：
//!
//! - **Idle → Starting → Active**: 任一输入变为非零。启动严格按顺序执行
//!   `set_manual_mode` → `start_drive` → 稳定延时，然后进入 Active 并启动周期任务
//! - **Active → Stopping → Idle**: 两个输入都为零。先取消并等待周期任务退出，
//!   再尽力发送 `stop_drive`（失败也会回到 Idle）
//!
//! 控制器的所有方法都要求 `&mut self`，调用方（驾驶 actor）负责串行化。

use std::sync::Arc;
use std::time::Duration;

use racer_driver::ApiError;
use racer_protocol::{DRIVE_TICK_PERIOD_MS, MAX_SPEED, START_SETTLE_DELAY_MS};
use tracing::{debug, info, warn};

use super::api::DriveApi;
use super::inputs::DriveInputs;
use super::metrics::{DriveMetrics, DriveMetricsSnapshot};
use super::state::{DriveSessionState, DriveStatus};
use super::ticker::DriveLoop;
use crate::error::DriveError;

/// 驾驶控制配置
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveConfig {
    /// 驾驶指令周期（默认 50ms，即 20 Hz）
    pub tick_period: Duration,
    /// 启动电机后进入 Active 前的等待时间
    pub settle_delay: Duration,
    /// 每条驾驶指令携带的最大速度
    pub max_speed: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_millis(DRIVE_TICK_PERIOD_MS),
            settle_delay: Duration::from_millis(START_SETTLE_DELAY_MS),
            max_speed: MAX_SPEED,
        }
    }
}

/// 驾驶控制器
///
/// 每个控制器最多持有一个周期任务。
pub struct DriveController<A: DriveApi> {
    api: Arc<A>,
    config: DriveConfig,
    inputs: Arc<DriveInputs>,
    status: Arc<DriveStatus>,
    metrics: Arc<DriveMetrics>,
    ticker: Option<DriveLoop>,
}

impl<A: DriveApi> DriveController<A> {
    pub fn new(api: Arc<A>, config: DriveConfig) -> Self {
        Self {
            api,
            config,
            inputs: Arc::new(DriveInputs::new()),
            status: Arc::new(DriveStatus::new()),
            metrics: Arc::new(DriveMetrics::new()),
            ticker: None,
        }
    }

    pub fn config(&self) -> &DriveConfig {
        &self.config
    }

    pub fn state(&self) -> DriveSessionState {
        self.status.state()
    }

    pub fn status(&self) -> &Arc<DriveStatus> {
        &self.status
    }

    pub fn inputs(&self) -> &Arc<DriveInputs> {
        &self.inputs
    }

    pub fn metrics(&self) -> DriveMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub(crate) fn metrics_handle(&self) -> Arc<DriveMetrics> {
        self.metrics.clone()
    }

    /// 更新转向角（限制到 [-1, 1]）并推进状态机
    ///
    /// # 错误
    /// - `DriveError::Startup`: 本次输入触发的启动序列失败
    /// - `DriveError::Stop`: 本次输入触发的停车指令失败
    pub async fn update_steering(&mut self, angle: f64) -> Result<(), DriveError> {
        let angle = self.inputs.set_angle(angle);
        debug!("Steering input: {:.3}", angle);
        self.reconcile().await
    }

    /// 更新油门（限制到 [-1, 1]）并推进状态机
    pub async fn update_throttle(&mut self, throttle: f64) -> Result<(), DriveError> {
        let throttle = self.inputs.set_throttle(throttle);
        debug!("Throttle input: {:.3}", throttle);
        self.reconcile().await
    }

    async fn reconcile(&mut self) -> Result<(), DriveError> {
        let neutral = self.inputs.is_neutral();
        match (self.state(), neutral) {
            (DriveSessionState::Idle, false) => self.start_loop().await,
            (DriveSessionState::Active, true) => self.stop_loop().await,
            _ => Ok(()),
        }
    }

    /// 运行启动序列并开始周期发送
    ///
    /// 已有周期任务时先取消它（恰好一次），再重新执行启动序列。
    /// 失败时回到 Idle，不自动重试。
    pub async fn start_loop(&mut self) -> Result<(), DriveError> {
        if let Some(ticker) = self.ticker.take() {
            debug!("Cancelling existing drive loop before restart");
            ticker.cancel().await;
            DriveMetrics::incr(&self.metrics.loops_cancelled);
        }

        self.status.set_state(DriveSessionState::Starting);
        info!("Starting drive loop");

        if let Err(e) = self.startup().await {
            self.status.set_state(DriveSessionState::Idle);
            DriveMetrics::incr(&self.metrics.start_failures);
            warn!("Drive startup failed: {}", e);
            self.status.record_error(e.to_string());
            return Err(DriveError::Startup(e));
        }

        tokio::time::sleep(self.config.settle_delay).await;

        self.ticker = Some(DriveLoop::spawn(
            self.api.clone(),
            self.inputs.clone(),
            self.config.tick_period,
            self.config.max_speed,
            self.metrics.clone(),
        ));
        self.status.set_state(DriveSessionState::Active);
        self.status.clear_error();
        DriveMetrics::incr(&self.metrics.loops_started);
        info!("Drive loop active");
        Ok(())
    }

    async fn startup(&self) -> Result<(), ApiError> {
        self.api.set_manual_mode().await?;
        self.api.start_drive().await
    }

    /// 停止周期发送并停车
    ///
    /// 周期任务退出后才发送 `stop_drive`；停车失败也会回到 Idle。
    pub async fn stop_loop(&mut self) -> Result<(), DriveError> {
        self.status.set_state(DriveSessionState::Stopping);
        info!("Stopping drive loop");

        if let Some(ticker) = self.ticker.take() {
            ticker.cancel().await;
            DriveMetrics::incr(&self.metrics.loops_cancelled);
        }

        let result = self.api.stop_drive().await;
        self.status.set_state(DriveSessionState::Idle);

        match result {
            Ok(()) => {
                info!("Car stopped");
                Ok(())
            },
            Err(e) => {
                DriveMetrics::incr(&self.metrics.stop_failures);
                warn!("Stop request failed: {}", e);
                self.status.record_error(e.to_string());
                Err(DriveError::Stop(e))
            },
        }
    }

    /// 清零输入；有周期任务在运行时停车
    pub async fn shutdown(&mut self) -> Result<(), DriveError> {
        self.inputs.clear();
        if self.ticker.is_some() || self.state().is_driving() {
            self.stop_loop().await
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use racer_protocol::DriveCommand;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Call {
        ManualMode,
        Start,
        Stop,
        Drive(f64, f64),
    }

    #[derive(Default)]
    struct MockApi {
        calls: Mutex<Vec<Call>>,
        fail_manual: AtomicBool,
        fail_drive: AtomicBool,
        fail_stop: AtomicBool,
    }

    impl MockApi {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().clone()
        }

        fn count(&self, wanted: fn(&Call) -> bool) -> usize {
            self.calls.lock().iter().filter(|c| wanted(c)).count()
        }

        fn outcome(&self, call: Call, fail: &AtomicBool) -> Result<(), ApiError> {
            self.calls.lock().push(call);
            if fail.load(Ordering::Relaxed) {
                Err(ApiError::DeviceRejected {
                    status: 500,
                    body: "internal error".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl DriveApi for MockApi {
        async fn set_manual_mode(&self) -> Result<(), ApiError> {
            self.outcome(Call::ManualMode, &self.fail_manual)
        }

        async fn start_drive(&self) -> Result<(), ApiError> {
            self.outcome(Call::Start, &AtomicBool::new(false))
        }

        async fn stop_drive(&self) -> Result<(), ApiError> {
            self.outcome(Call::Stop, &self.fail_stop)
        }

        async fn send_command(&self, command: DriveCommand) -> Result<(), ApiError> {
            self.outcome(
                Call::Drive(command.angle, command.throttle),
                &self.fail_drive,
            )
        }
    }

    fn controller() -> (Arc<MockApi>, DriveController<MockApi>) {
        let api = Arc::new(MockApi::default());
        let controller = DriveController::new(api.clone(), DriveConfig::default());
        (api, controller)
    }

    fn is_drive(call: &Call) -> bool {
        matches!(call, Call::Drive(..))
    }

    #[test]
    fn test_default_config() {
        let config = DriveConfig::default();
        assert_eq!(config.tick_period, Duration::from_millis(50));
        assert_eq!(config.settle_delay, Duration::from_millis(100));
        assert_eq!(config.max_speed, 0.5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nonzero_input_starts_in_order() {
        let (api, mut controller) = controller();
        assert_eq!(controller.state(), DriveSessionState::Idle);

        controller.update_throttle(0.4).await.unwrap();
        assert_eq!(controller.state(), DriveSessionState::Active);

        tokio::time::sleep(Duration::from_millis(175)).await;

        let calls = api.calls();
        assert_eq!(calls[0], Call::ManualMode);
        assert_eq!(calls[1], Call::Start);
        assert!(calls[2..].iter().all(is_drive));
        assert!(calls[2..].iter().all(|c| *c == Call::Drive(0.0, 0.4)));
        let ticks = api.count(is_drive);
        assert!((3..=4).contains(&ticks), "unexpected tick count {ticks}");
        assert_eq!(controller.metrics().loops_started, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_use_latest_inputs() {
        let (api, mut controller) = controller();
        controller.update_throttle(0.5).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        controller.update_steering(-2.0).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        let last = api.calls().into_iter().rev().find(is_drive).unwrap();
        assert_eq!(last, Call::Drive(-1.0, 0.5));
        // 输入变化不会重新执行启动序列
        assert_eq!(api.count(|c| *c == Call::Start), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_neutral_input_stops_after_loop_exits() {
        let (api, mut controller) = controller();
        controller.update_throttle(0.3).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        controller.update_throttle(0.0).await.unwrap();
        assert_eq!(controller.state(), DriveSessionState::Idle);

        let sent_before = api.count(is_drive);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(api.count(is_drive), sent_before);

        let calls = api.calls();
        assert_eq!(calls.last(), Some(&Call::Stop));
        let stop_index = calls.iter().position(|c| *c == Call::Stop).unwrap();
        assert!(!calls[stop_index..].iter().any(is_drive));
        assert_eq!(controller.metrics().loops_cancelled, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_on_one_axis_keeps_driving() {
        let (api, mut controller) = controller();
        controller.update_throttle(0.3).await.unwrap();
        controller.update_steering(0.2).await.unwrap();
        controller.update_throttle(0.0).await.unwrap();

        assert_eq!(controller.state(), DriveSessionState::Active);
        assert_eq!(api.count(|c| *c == Call::Stop), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous_loop_once() {
        let (api, mut controller) = controller();
        controller.update_throttle(0.6).await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        controller.start_loop().await.unwrap();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(controller.state(), DriveSessionState::Active);
        let metrics = controller.metrics();
        assert_eq!(metrics.loops_cancelled, 1);
        assert_eq!(metrics.loops_started, 2);
        assert_eq!(api.count(|c| *c == Call::ManualMode), 2);
        assert_eq!(api.count(|c| *c == Call::Start), 2);

        // 第二次启动序列期间没有驾驶指令
        let calls = api.calls();
        let second_manual = calls
            .iter()
            .rposition(|c| *c == Call::ManualMode)
            .unwrap();
        assert_eq!(calls[second_manual + 1], Call::Start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_failure_returns_to_idle() {
        let (api, mut controller) = controller();
        api.fail_manual.store(true, Ordering::Relaxed);

        let err = controller.update_throttle(0.5).await.unwrap_err();
        assert!(matches!(err, DriveError::Startup(_)));
        assert_eq!(controller.state(), DriveSessionState::Idle);
        assert_eq!(api.calls(), vec![Call::ManualMode]);
        assert_eq!(controller.metrics().start_failures, 1);
        assert!(controller.status().last_error().is_some());

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(api.count(is_drive), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_tick_does_not_stop_loop() {
        let (api, mut controller) = controller();
        api.fail_drive.store(true, Ordering::Relaxed);

        controller.update_throttle(0.5).await.unwrap();
        tokio::time::sleep(Duration::from_millis(175)).await;

        assert_eq!(controller.state(), DriveSessionState::Active);
        let metrics = controller.metrics();
        assert!(metrics.tick_failures >= 3);
        assert_eq!(metrics.ticks_sent, 0);

        api.fail_drive.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(controller.metrics().ticks_sent >= 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_failure_still_reaches_idle() {
        let (api, mut controller) = controller();
        api.fail_stop.store(true, Ordering::Relaxed);

        controller.update_steering(0.5).await.unwrap();
        let err = controller.update_steering(0.0).await.unwrap_err();

        assert!(matches!(err, DriveError::Stop(_)));
        assert_eq!(controller.state(), DriveSessionState::Idle);
        assert_eq!(controller.metrics().stop_failures, 1);
        assert_eq!(api.calls().last(), Some(&Call::Stop));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_running_loop() {
        let (api, mut controller) = controller();
        controller.update_throttle(0.5).await.unwrap();

        controller.shutdown().await.unwrap();
        assert_eq!(controller.state(), DriveSessionState::Idle);
        assert!(controller.inputs().is_neutral());
        assert_eq!(api.calls().last(), Some(&Call::Stop));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_when_idle_sends_nothing() {
        let (api, mut controller) = controller();
        controller.shutdown().await.unwrap();
        assert!(api.calls().is_empty());
    }
}
