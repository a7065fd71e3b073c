//! 基于 reqwest 的 HTTP(S) 传输实现

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use racer_protocol::{FORM_CONTENT_TYPE, HOME_PATH};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use tracing::{debug, trace};

use crate::{DeviceAddress, TransportConfig, TransportError};

/// 流式响应的字节块流
pub type ByteStream = BoxStream<'static, Result<Bytes, TransportError>>;

/// 原始 HTTP 响应（状态码 + 完整响应体）
///
/// 传输层不判定成败，由认证器 / API 客户端根据接口语义解释。
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Bytes,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 响应体文本（非法 UTF-8 按替换字符处理）
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// 设备 HTTP(S) 传输
///
/// 内部持有单个 `reqwest::Client`（Arc 实现，Clone 轻量）。所有克隆共享同一个
/// Cookie 存储，因此登录时积累的 Cookie 会自动附加到之后的每个请求上。
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    address: DeviceAddress,
    config: TransportConfig,
}

impl HttpTransport {
    /// 创建传输实例
    ///
    /// # 错误
    /// - `TransportError::Build`: TLS 后端或客户端初始化失败
    pub fn new(address: DeviceAddress, config: TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(TransportError::Build)?;

        debug!(
            "Transport created for {} (scheme={}, insecure_skip_verify={})",
            address,
            config.scheme.as_str(),
            config.insecure_skip_verify
        );

        Ok(Self {
            client,
            address,
            config,
        })
    }

    pub fn address(&self) -> &DeviceAddress {
        &self.address
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// 拼接完整 URL（`path` 以 `/` 开头，可带查询参数）
    pub fn url(&self, path: &str) -> String {
        format!("{}://{}{}", self.config.scheme.as_str(), self.address, path)
    }

    /// 设备首页 URL（变更类请求的 Referer）
    pub fn home_url(&self) -> String {
        self.url(HOME_PATH)
    }

    /// GET 请求
    pub async fn get(&self, path: &str) -> Result<RawResponse, TransportError> {
        let request = self.client.get(self.url(path));
        self.execute("GET", path, request).await
    }

    /// POST 表单请求（`application/x-www-form-urlencoded; charset=UTF-8`）
    pub async fn post_form(
        &self,
        path: &str,
        body: String,
        headers: &[(&str, &str)],
    ) -> Result<RawResponse, TransportError> {
        let request = self
            .client
            .post(self.url(path))
            .headers(build_headers(headers)?)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body);
        self.execute("POST", path, request).await
    }

    /// PUT JSON 请求（`application/json`）
    pub async fn put_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
        headers: &[(&str, &str)],
    ) -> Result<RawResponse, TransportError> {
        let request = self
            .client
            .put(self.url(path))
            .headers(build_headers(headers)?)
            .json(body);
        self.execute("PUT", path, request).await
    }

    /// 打开流式 GET 请求
    ///
    /// 不应用 `request_timeout`（流是持续的），只受连接超时约束。
    ///
    /// # 错误
    /// - `TransportError::Status`: 响应状态非 2xx
    pub async fn open_stream(
        &self,
        path: &str,
        headers: &[(&str, &str)],
    ) -> Result<ByteStream, TransportError> {
        let response = self
            .client
            .get(self.url(path))
            .headers(build_headers(headers)?)
            .send()
            .await
            .map_err(TransportError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        debug!("Stream opened: {} ({})", path, status);
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(TransportError::from_request))
            .boxed())
    }

    async fn execute(
        &self,
        method: &str,
        path: &str,
        request: RequestBuilder,
    ) -> Result<RawResponse, TransportError> {
        let response = request
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(TransportError::from_request)?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(TransportError::from_request)?;

        trace!("{} {} -> {} ({} bytes)", method, path, status, body.len());
        Ok(RawResponse { status, body })
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("address", &self.address)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

fn build_headers(headers: &[(&str, &str)]) -> Result<HeaderMap, TransportError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|_| TransportError::InvalidHeader {
                name: name.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| TransportError::InvalidHeader {
                name: name.to_string(),
            })?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
