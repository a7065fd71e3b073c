//! 驾驶 actor
//!
//! [`DriveController`] 只在一个任务中运行，输入通过无界通道串行送达。
//! UI 线程调用 [`DriveHandle::update_steering`] 等方法不会阻塞。

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::control::{
    DriveApi, DriveController, DriveInputs, DriveMetrics, DriveMetricsSnapshot,
    DriveSessionState, DriveStatus,
};
use crate::error::DriveError;

enum DriveMessage {
    Steering(f64),
    Throttle(f64),
    Shutdown(oneshot::Sender<Result<(), DriveError>>),
}

/// 驾驶 actor 句柄
///
/// 句柄被丢弃时通道关闭，actor 会清零输入并停车后退出。
pub struct DriveHandle {
    tx: mpsc::UnboundedSender<DriveMessage>,
    status: Arc<DriveStatus>,
    inputs: Arc<DriveInputs>,
    metrics: Arc<DriveMetrics>,
    task: Option<JoinHandle<()>>,
}

impl DriveHandle {
    /// 在当前 tokio 运行时中启动 actor
    pub fn spawn<A: DriveApi>(controller: DriveController<A>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let status = controller.status().clone();
        let inputs = controller.inputs().clone();
        let metrics = controller.metrics_handle();
        let task = tokio::spawn(run(controller, rx));
        Self {
            tx,
            status,
            inputs,
            metrics,
            task: Some(task),
        }
    }

    /// 提交转向输入（不等待处理结果）
    pub fn update_steering(&self, angle: f64) -> Result<(), DriveError> {
        self.tx
            .send(DriveMessage::Steering(angle))
            .map_err(|_| DriveError::ActorClosed)
    }

    /// 提交油门输入（不等待处理结果）
    pub fn update_throttle(&self, throttle: f64) -> Result<(), DriveError> {
        self.tx
            .send(DriveMessage::Throttle(throttle))
            .map_err(|_| DriveError::ActorClosed)
    }

    pub fn state(&self) -> DriveSessionState {
        self.status.state()
    }

    pub fn status(&self) -> &Arc<DriveStatus> {
        &self.status
    }

    /// actor 已处理的最新输入
    pub fn inputs(&self) -> &Arc<DriveInputs> {
        &self.inputs
    }

    pub fn metrics(&self) -> DriveMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 停车并等待 actor 退出
    ///
    /// 重复调用直接返回 `Ok(())`。
    pub async fn shutdown(&mut self) -> Result<(), DriveError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        if self.tx.send(DriveMessage::Shutdown(reply_tx)).is_err() {
            return Err(DriveError::ActorClosed);
        }
        let result = reply_rx.await.map_err(|_| DriveError::ActorClosed)?;

        if let Err(e) = task.await {
            warn!("Drive actor task failed: {}", e);
        }
        result
    }
}

async fn run<A: DriveApi>(
    mut controller: DriveController<A>,
    mut rx: mpsc::UnboundedReceiver<DriveMessage>,
) {
    while let Some(message) = rx.recv().await {
        let result = match message {
            DriveMessage::Steering(angle) => controller.update_steering(angle).await,
            DriveMessage::Throttle(throttle) => controller.update_throttle(throttle).await,
            DriveMessage::Shutdown(reply) => {
                let result = controller.shutdown().await;
                let _ = reply.send(result);
                debug!("Drive actor shut down");
                return;
            },
        };
        // 错误已记录在 DriveStatus 中
        if let Err(e) = result {
            warn!("Drive input handling failed: {}", e);
        }
    }

    debug!("All drive handles dropped, stopping the car");
    if let Err(e) = controller.shutdown().await {
        warn!("Failed to stop the car on exit: {}", e);
    }
}
