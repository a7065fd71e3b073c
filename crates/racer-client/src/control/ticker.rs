//! 20 Hz 驾驶指令周期任务

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, trace, warn};

use super::api::DriveApi;
use super::inputs::DriveInputs;
use super::metrics::DriveMetrics;

/// 正在运行的周期任务
///
/// 每个 tick 读取最新输入并发送一次驾驶指令，不做边沿触发，输入不变也照常发送。
/// 单次发送失败只记录和计数，不会结束循环。
pub(crate) struct DriveLoop {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DriveLoop {
    pub(crate) fn spawn<A: DriveApi>(
        api: Arc<A>,
        inputs: Arc<DriveInputs>,
        period: Duration,
        max_speed: f64,
        metrics: Arc<DriveMetrics>,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(run(api, inputs, period, max_speed, metrics, shutdown_rx));
        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// 取消并等待任务退出
    ///
    /// 正在发送的指令会先完成，返回后不会再有新的驾驶指令发出。
    pub(crate) async fn cancel(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Drive loop task failed: {}", e);
            }
        }
    }
}

impl Drop for DriveLoop {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn run<A: DriveApi>(
    api: Arc<A>,
    inputs: Arc<DriveInputs>,
    period: Duration,
    max_speed: f64,
    metrics: Arc<DriveMetrics>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!("Drive loop running every {:?}", period);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {},
        }

        let command = inputs.command(max_speed);
        match api.send_command(command).await {
            Ok(()) => {
                DriveMetrics::incr(&metrics.ticks_sent);
                trace!(
                    "Drive tick sent: angle={:.3}, throttle={:.3}",
                    command.angle, command.throttle
                );
            },
            Err(e) => {
                DriveMetrics::incr(&metrics.tick_failures);
                warn!("Drive tick failed: {}", e);
            },
        }
    }

    debug!("Drive loop exited");
}
