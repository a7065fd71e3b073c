//! 电量后台轮询

use std::time::Duration;

use racer_driver::{BatteryOutcome, DeviceApiClient};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, trace, warn};

/// 电量轮询任务
///
/// 每个周期查询一次电量；会话未认证时跳过（等待调用方重新登录），
/// 不会自动重新登录。
pub struct BatteryPoller {
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl BatteryPoller {
    /// 启动轮询，第一次查询在一个周期之后
    pub fn spawn(api: DeviceApiClient, period: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(poll_loop(api, period, shutdown_rx));
        Self {
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// 停止轮询并等待任务退出
    pub async fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!("Battery poller task failed: {}", e);
            }
            debug!("Battery poller stopped");
        }
    }
}

impl Drop for BatteryPoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

async fn poll_loop(api: DeviceApiClient, period: Duration, mut shutdown: oneshot::Receiver<()>) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = ticker.tick() => {},
        }

        if !api.session().is_authenticated() {
            trace!("Session not authenticated, skipping battery poll");
            continue;
        }

        match api.fetch_battery().await {
            Ok(BatteryOutcome::Level(state)) => {
                trace!("Battery poll: {:?}", state);
            },
            Ok(BatteryOutcome::Expired) => {
                warn!("Session expired, battery polling paused until re-authentication");
            },
            Err(e) => {
                warn!("Battery poll failed: {}", e);
            },
        }
    }
}
