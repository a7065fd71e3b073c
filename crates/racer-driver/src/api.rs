//! 设备 API 客户端
//!
//! 对驾驶模式、启停、手动驾驶、电量查询四类接口的认证封装。
//!
//! # 请求头
//!
//! 每个变更类请求（PUT）都带上：
//! - `X-CSRFToken: <token>`
//! - `Referer: <scheme>://<address>/home`
//!
//! 会话没有 token 时直接返回 [`ApiError::MissingCsrfToken`]，请求不会发出。
//!
//! # 会话过期
//!
//! 设备在会话失效后对电量接口返回登录页 HTML。`fetch_battery` 在 JSON 解析之前
//! 先嗅探 HTML，命中则把会话标记为未认证，并返回 [`BatteryOutcome::Expired`]。

use std::sync::Arc;

use arc_swap::ArcSwap;
use racer_protocol::{
    BatteryResponse, BatteryState, CSRF_HEADER, DriveCommand, DriveModeRequest, Endpoint,
    StartStopRequest, looks_like_html,
};
use racer_transport::{HttpTransport, RawResponse, TransportError};
use serde::Serialize;
use tracing::{debug, trace, warn};

use crate::error::ApiError;
use crate::metrics::ApiMetrics;
use crate::session::Session;

const SESSION_EXPIRED_MESSAGE: &str = "Session expired";

/// 电量查询结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryOutcome {
    /// 设备返回了电量（`success == false` 时为未知状态）
    Level(BatteryState),
    /// 设备返回登录页，会话已失效
    Expired,
}

impl BatteryOutcome {
    /// 转为错误形式（`Expired` → `ApiError::SessionExpired`）
    pub fn into_result(self) -> Result<BatteryState, ApiError> {
        match self {
            BatteryOutcome::Level(state) => Ok(state),
            BatteryOutcome::Expired => Err(ApiError::SessionExpired),
        }
    }
}

/// 设备 API 客户端
///
/// Clone 轻量：传输、会话、电量状态和指标都是共享的。
#[derive(Debug, Clone)]
pub struct DeviceApiClient {
    transport: HttpTransport,
    session: Session,
    battery: Arc<ArcSwap<BatteryState>>,
    metrics: Arc<ApiMetrics>,
}

impl DeviceApiClient {
    pub fn new(transport: HttpTransport, session: Session) -> Self {
        Self {
            transport,
            session,
            battery: Arc::new(ArcSwap::from_pointee(BatteryState::unknown())),
            metrics: Arc::new(ApiMetrics::new()),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    pub fn metrics(&self) -> &Arc<ApiMetrics> {
        &self.metrics
    }

    /// 最近一次查询得到的电量状态
    pub fn battery(&self) -> BatteryState {
        **self.battery.load()
    }

    /// 切换到手动驾驶模式
    pub async fn set_manual_mode(&self) -> Result<(), ApiError> {
        debug!("Setting drive mode: manual");
        self.put_mutating(Endpoint::DriveMode, &DriveModeRequest::manual())
            .await
    }

    /// 启动电机
    pub async fn start_drive(&self) -> Result<(), ApiError> {
        debug!("Sending start");
        self.put_mutating(Endpoint::StartStop, &StartStopRequest::start())
            .await
    }

    /// 停止电机
    pub async fn stop_drive(&self) -> Result<(), ApiError> {
        debug!("Sending stop");
        self.put_mutating(Endpoint::StartStop, &StartStopRequest::stop())
            .await
    }

    /// 发送单次驾驶指令
    ///
    /// **注意**：这里不再限幅，调用方负责把输入限制在 [-1, 1]。
    pub async fn drive(&self, angle: f64, throttle: f64) -> Result<(), ApiError> {
        self.send_command(DriveCommand::new(angle, throttle)).await
    }

    pub async fn send_command(&self, command: DriveCommand) -> Result<(), ApiError> {
        trace!(
            "Drive command: angle={:.3}, throttle={:.3}",
            command.angle, command.throttle
        );
        self.put_mutating(Endpoint::ManualDrive, &command.to_request())
            .await
    }

    /// 查询电量
    ///
    /// # 错误
    /// - `ApiError::NotAuthenticated`: 会话未认证（不发请求）
    /// - `ApiError::Network`: 请求未完成
    /// - `ApiError::DeviceRejected`: 非 2xx 且非 HTML
    /// - `ApiError::Decode`: 响应既不是 HTML 也不是合法 JSON
    pub async fn fetch_battery(&self) -> Result<BatteryOutcome, ApiError> {
        if !self.session.is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }

        let response = self.send(self.transport.get(Endpoint::Battery.path())).await?;

        if looks_like_html(&response.body) {
            warn!(
                "Received HTML instead of JSON from {}, session expired",
                self.session.address()
            );
            ApiMetrics::incr(&self.metrics.session_expiries);
            self.session
                .record_failure(SESSION_EXPIRED_MESSAGE.to_string());
            return Ok(BatteryOutcome::Expired);
        }

        let response = self.check_status(response)?;
        let parsed = BatteryResponse::parse(&response.body)?;
        let state = BatteryState::from_response(&parsed);
        self.battery.store(Arc::new(state));

        debug!(
            "Battery level: {} (success={})",
            parsed.battery_level, parsed.success
        );
        Ok(BatteryOutcome::Level(state))
    }

    async fn put_mutating<T: Serialize + ?Sized>(
        &self,
        endpoint: Endpoint,
        body: &T,
    ) -> Result<(), ApiError> {
        debug_assert!(endpoint.is_mutating());
        let Some(token) = self.session.csrf_token() else {
            ApiMetrics::incr(&self.metrics.local_rejections);
            return Err(ApiError::MissingCsrfToken);
        };
        let referer = self.transport.home_url();
        let headers = [(CSRF_HEADER, token.as_str()), ("Referer", referer.as_str())];

        let response = self
            .send(self.transport.put_json(endpoint.path(), body, &headers))
            .await?;
        self.check_status(response).map(|_| ())
    }

    async fn send(
        &self,
        request: impl Future<Output = Result<RawResponse, TransportError>>,
    ) -> Result<RawResponse, ApiError> {
        ApiMetrics::incr(&self.metrics.requests_sent);
        request.await.map_err(|e| {
            ApiMetrics::incr(&self.metrics.network_errors);
            ApiError::Network(e)
        })
    }

    fn check_status(&self, response: RawResponse) -> Result<RawResponse, ApiError> {
        if response.is_success() {
            return Ok(response);
        }
        ApiMetrics::incr(&self.metrics.device_rejections);
        Err(ApiError::DeviceRejected {
            status: response.status,
            body: response.text(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Credential;
    use racer_transport::{DeviceAddress, TransportConfig};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> DeviceApiClient {
        let authority = server.uri().trim_start_matches("http://").to_string();
        let address = DeviceAddress::parse(&authority).unwrap();
        let transport = HttpTransport::new(address.clone(), TransportConfig::plain_http()).unwrap();
        let session = Session::new(address, Credential::new("pw"));
        DeviceApiClient::new(transport, session)
    }

    fn authenticated_client_for(server: &MockServer) -> DeviceApiClient {
        let client = client_for(server);
        client.session().establish("tok-123".to_string());
        client
    }

    #[tokio::test]
    async fn test_missing_token_fails_locally() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let result = client.drive(0.5, 0.5).await;
        assert!(matches!(result, Err(ApiError::MissingCsrfToken)));
        assert!(matches!(
            client.start_drive().await,
            Err(ApiError::MissingCsrfToken)
        ));

        let snapshot = client.metrics().snapshot();
        assert_eq!(snapshot.requests_sent, 0);
        assert_eq!(snapshot.local_rejections, 2);
    }

    #[tokio::test]
    async fn test_mutating_calls_carry_csrf_and_referer() {
        let server = MockServer::start().await;
        let referer = format!("{}/home", server.uri());
        Mock::given(method("PUT"))
            .and(path("/api/drive_mode"))
            .and(header("x-csrftoken", "tok-123"))
            .and(header("referer", referer.as_str()))
            .and(body_json(serde_json::json!({ "drive_mode": "manual" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/api/start_stop"))
            .and(header("x-csrftoken", "tok-123"))
            .and(body_json(serde_json::json!({ "start_stop": "stop" })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = authenticated_client_for(&server);
        client.set_manual_mode().await.unwrap();
        client.stop_drive().await.unwrap();
    }

    #[tokio::test]
    async fn test_drive_sends_max_speed() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/manual_drive"))
            .and(body_json(serde_json::json!({
                "angle": -0.25,
                "throttle": 0.75,
                "max_speed": 0.5
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = authenticated_client_for(&server);
        client.drive(-0.25, 0.75).await.unwrap();
    }

    #[tokio::test]
    async fn test_non_success_maps_to_device_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/start_stop"))
            .respond_with(ResponseTemplate::new(500).set_body_string("motor fault"))
            .mount(&server)
            .await;

        let client = authenticated_client_for(&server);
        match client.start_drive().await {
            Err(ApiError::DeviceRejected { status, body }) => {
                assert_eq!(status, 500);
                assert_eq!(body, "motor fault");
            },
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(client.metrics().snapshot().device_rejections, 1);
    }

    #[tokio::test]
    async fn test_fetch_battery_updates_state() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get_battery_level"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "battery_level": 72, "success": true })),
            )
            .mount(&server)
            .await;

        let client = authenticated_client_for(&server);
        assert!(!client.battery().known);

        let outcome = client.fetch_battery().await.unwrap();
        assert_eq!(outcome, BatteryOutcome::Level(BatteryState::known(72)));
        assert_eq!(client.battery(), BatteryState::known(72));
    }

    #[tokio::test]
    async fn test_fetch_battery_unsuccessful_is_unknown() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get_battery_level"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "battery_level": 0, "success": false })),
            )
            .mount(&server)
            .await;

        let client = authenticated_client_for(&server);
        let state = client.fetch_battery().await.unwrap().into_result().unwrap();
        assert_eq!(state, BatteryState::unknown());
        assert_eq!(state.level, -1);
    }

    #[tokio::test]
    async fn test_html_battery_response_expires_session() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get_battery_level"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<!DOCTYPE html>\n<html><body>Login</body></html>"),
            )
            .mount(&server)
            .await;

        let client = authenticated_client_for(&server);
        let outcome = client.fetch_battery().await.unwrap();
        assert_eq!(outcome, BatteryOutcome::Expired);
        assert!(matches!(
            outcome.into_result(),
            Err(ApiError::SessionExpired)
        ));

        let snapshot = client.session().snapshot();
        assert!(!snapshot.authenticated);
        assert!(!snapshot.has_csrf_token);
        assert_eq!(snapshot.last_error.as_deref(), Some("Session expired"));
        assert_eq!(client.metrics().snapshot().session_expiries, 1);

        // 过期后变更类请求在本地被拦截
        assert!(matches!(
            client.drive(0.1, 0.1).await,
            Err(ApiError::MissingCsrfToken)
        ));
    }

    #[tokio::test]
    async fn test_fetch_battery_requires_authentication() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.fetch_battery().await,
            Err(ApiError::NotAuthenticated)
        ));
    }

    #[tokio::test]
    async fn test_fetch_battery_invalid_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/get_battery_level"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"battery_level\":"))
            .mount(&server)
            .await;

        let client = authenticated_client_for(&server);
        assert!(matches!(
            client.fetch_battery().await,
            Err(ApiError::Decode(_))
        ));
        // 解析失败不改变会话
        assert!(client.session().is_authenticated());
    }
}
