//! 驾驶控制器依赖的设备接口

use async_trait::async_trait;
use racer_driver::{ApiError, DeviceApiClient};
use racer_protocol::DriveCommand;

/// 驾驶控制器所需的设备操作
///
/// [`DeviceApiClient`] 是生产实现；测试中可以用记录调用顺序的模拟实现替换。
#[async_trait]
pub trait DriveApi: Send + Sync + 'static {
    async fn set_manual_mode(&self) -> Result<(), ApiError>;

    async fn start_drive(&self) -> Result<(), ApiError>;

    async fn stop_drive(&self) -> Result<(), ApiError>;

    async fn send_command(&self, command: DriveCommand) -> Result<(), ApiError>;
}

#[async_trait]
impl DriveApi for DeviceApiClient {
    async fn set_manual_mode(&self) -> Result<(), ApiError> {
        DeviceApiClient::set_manual_mode(self).await
    }

    async fn start_drive(&self) -> Result<(), ApiError> {
        DeviceApiClient::start_drive(self).await
    }

    async fn stop_drive(&self) -> Result<(), ApiError> {
        DeviceApiClient::stop_drive(self).await
    }

    async fn send_command(&self, command: DriveCommand) -> Result<(), ApiError> {
        DeviceApiClient::send_command(self, command).await
    }
}
