//! 高层客户端
//!
//! 把登录、设备 API、驾驶 actor、电量轮询与视频流组合为一个连接对象。
//!
//! # 使用示例
//!
//! ```no_run
//! use racer_client::{ClientConfig, RacerClient};
//! use racer_driver::Credential;
//!
//! # async fn run() -> Result<(), racer_client::ClientError> {
//! let mut client =
//!     RacerClient::connect("192.168.1.100", Credential::new("secret"), ClientConfig::default())
//!         .await?;
//!
//! client.update_throttle(0.3)?;
//! tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//! client.update_throttle(0.0)?;
//!
//! println!("{:?}", client.observer().snapshot());
//! client.disconnect().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use racer_driver::{
    ApiMetricsSnapshot, BatteryOutcome, Credential, DeviceApiClient, Session, SessionAuthenticator,
};
use racer_protocol::{BATTERY_POLL_INTERVAL_SECS, BatteryState};
use racer_stream::{FrameCallback, MjpegStreamer, StreamConfig, VideoFrame};
use racer_transport::{DeviceAddress, HttpTransport, TransportConfig};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::actor::DriveHandle;
use crate::battery::BatteryPoller;
use crate::control::{DriveConfig, DriveController, DriveMetricsSnapshot, DriveSessionState};
use crate::error::ClientError;
use crate::observer::Observer;

/// 客户端配置
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub transport: TransportConfig,
    pub drive: DriveConfig,
    pub stream: StreamConfig,
    /// 电量轮询周期
    pub battery_poll_interval: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport: TransportConfig::default(),
            drive: DriveConfig::default(),
            stream: StreamConfig::default(),
            battery_poll_interval: Duration::from_secs(BATTERY_POLL_INTERVAL_SECS),
        }
    }
}

/// 已连接的小车
pub struct RacerClient {
    authenticator: SessionAuthenticator,
    api: DeviceApiClient,
    drive: DriveHandle,
    poller: BatteryPoller,
    streamer: MjpegStreamer,
    observer: Observer,
}

impl RacerClient {
    /// 连接设备
    ///
    /// 依次执行：登录握手 → 查询一次电量确认链路 → 启动电量轮询与驾驶 actor。
    ///
    /// # 参数
    /// - `address`: 设备地址 `host[:port]`
    /// - `credential`: 设备密码
    ///
    /// # 错误
    /// - `ClientError::Transport`: 地址非法或 HTTP 客户端构建失败
    /// - `ClientError::Auth`: 登录失败
    /// - `ClientError::Api`: 首次电量查询失败或会话立即过期
    pub async fn connect(
        address: &str,
        credential: Credential,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let address = DeviceAddress::parse(address)?;
        let transport = HttpTransport::new(address, config.transport.clone())?;

        info!("Connecting to {}", transport.address());
        let authenticator = SessionAuthenticator::new(transport.clone());
        let session = authenticator.authenticate(credential).await?;

        let api = DeviceApiClient::new(transport.clone(), session);
        let battery = api.fetch_battery().await?.into_result()?;
        info!("Connected, battery: {:?}", battery);

        let poller = BatteryPoller::spawn(api.clone(), config.battery_poll_interval);
        let controller = DriveController::new(Arc::new(api.clone()), config.drive);
        let drive = DriveHandle::spawn(controller);
        let observer = Observer::new(api.clone(), drive.status().clone());
        let streamer = MjpegStreamer::new(transport, config.stream);

        Ok(Self {
            authenticator,
            api,
            drive,
            poller,
            streamer,
            observer,
        })
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }

    pub fn api(&self) -> &DeviceApiClient {
        &self.api
    }

    pub fn observer(&self) -> Observer {
        self.observer.clone()
    }

    /// 提交转向输入（[-1, 1]，超出范围会被限幅）
    pub fn update_steering(&self, angle: f64) -> Result<(), ClientError> {
        Ok(self.drive.update_steering(angle)?)
    }

    /// 提交油门输入（[-1, 1]，超出范围会被限幅）
    pub fn update_throttle(&self, throttle: f64) -> Result<(), ClientError> {
        Ok(self.drive.update_throttle(throttle)?)
    }

    pub fn drive_state(&self) -> DriveSessionState {
        self.drive.state()
    }

    /// 立即查询一次电量
    pub async fn fetch_battery(&self) -> Result<BatteryOutcome, ClientError> {
        Ok(self.api.fetch_battery().await?)
    }

    /// 最近一次查询到的电量
    pub fn battery(&self) -> BatteryState {
        self.api.battery()
    }

    /// 会话过期后重新登录（复用同一个会话句柄）
    pub async fn reauthenticate(&self) -> Result<(), ClientError> {
        self.authenticator
            .reauthenticate(self.api.session())
            .await?;
        Ok(())
    }

    /// 打开视频流
    pub async fn start_video(&mut self) -> Result<(), ClientError> {
        self.streamer.start().await?;
        Ok(())
    }

    /// 关闭视频流并清空最新帧
    pub async fn stop_video(&mut self) {
        self.streamer.stop().await;
    }

    pub fn is_video_running(&self) -> bool {
        self.streamer.is_running()
    }

    pub fn add_frame_callback(&self, callback: Arc<dyn FrameCallback>) {
        self.streamer.add_callback(callback);
    }

    /// 订阅最新帧
    pub fn subscribe_frames(&self) -> watch::Receiver<Option<VideoFrame>> {
        self.streamer.subscribe()
    }

    pub fn latest_frame(&self) -> Option<VideoFrame> {
        self.streamer.latest_frame()
    }

    pub fn drive_metrics(&self) -> DriveMetricsSnapshot {
        self.drive.metrics()
    }

    pub fn api_metrics(&self) -> ApiMetricsSnapshot {
        self.api.metrics().snapshot()
    }

    /// 断开连接
    ///
    /// 关闭视频流与电量轮询，停车（尽力而为），最后重置会话。
    /// 停车失败会返回错误，但其余资源仍会释放。
    pub async fn disconnect(&mut self) -> Result<(), ClientError> {
        self.streamer.stop().await;
        self.poller.stop().await;
        let result = self.drive.shutdown().await;
        self.api.session().reset();
        info!("Disconnected from {}", self.api.session().address());

        if let Err(e) = &result {
            warn!("Car may not have stopped cleanly: {}", e);
        }
        Ok(result?)
    }
}
