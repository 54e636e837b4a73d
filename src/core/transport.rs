//! HTTP 传输层：探测请求和 Range 请求
//!
//! 下载流程只依赖 [`RangeTransport`]，默认实现 [`AwcTransport`] 基于 awc。
//! 每次请求都新建客户端并强制关闭连接，探测用的连接不会被分块请求复用。

use async_trait::async_trait;
use awc::http::header;
use bytes::Bytes;
use futures::stream::LocalBoxStream;
use futures::StreamExt;
use std::time::Duration;
use url::Url;

use crate::core::error::DownloadError;

/// 响应体字节流
pub type BodyStream = LocalBoxStream<'static, Result<Bytes, DownloadError>>;

/// 探测请求的响应头信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResponse {
    pub status: u16,
    pub accept_ranges: Option<String>,
    pub content_length: Option<u64>,
}

/// Range 请求的响应
pub struct RangeResponse {
    pub status: u16,
    pub body: BodyStream,
}

#[async_trait(?Send)]
pub trait RangeTransport {
    /// 发送 HEAD 请求，只读取响应头
    async fn head(&self, url: &Url) -> Result<ProbeResponse, DownloadError>;

    /// 发送 `Range: bytes=<start>-<end>` 请求，end 为闭区间
    async fn get_range(&self, url: &Url, start: u64, end: u64) -> Result<RangeResponse, DownloadError>;
}

/// 基于 awc 的传输实现
#[derive(Debug, Clone)]
pub struct AwcTransport {
    user_agent: String,
    timeout: Option<Duration>,
}

impl AwcTransport {
    /// timeout 为 0 表示不设超时
    pub fn new(user_agent: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            user_agent: user_agent.into(),
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }

    fn client(&self) -> awc::Client {
        let builder = awc::Client::builder()
            .add_default_header((header::USER_AGENT, self.user_agent.clone()));
        match self.timeout {
            Some(timeout) => builder.timeout(timeout).finish(),
            None => builder.disable_timeout().finish(),
        }
    }
}

#[async_trait(?Send)]
impl RangeTransport for AwcTransport {
    async fn head(&self, url: &Url) -> Result<ProbeResponse, DownloadError> {
        let response = self.client()
            .head(url.as_str())
            .insert_header((header::ACCEPT_ENCODING, "identity"))
            .force_close()
            .send()
            .await
            .map_err(|e| DownloadError::network_error(e.to_string()))?;

        let headers = response.headers();
        Ok(ProbeResponse {
            status: response.status().as_u16(),
            accept_ranges: headers.get(header::ACCEPT_RANGES)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string()),
            content_length: headers.get(header::CONTENT_LENGTH)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok()),
        })
    }

    async fn get_range(&self, url: &Url, start: u64, end: u64) -> Result<RangeResponse, DownloadError> {
        let range_header = format!("bytes={}-{}", start, end);
        log::debug!("请求 {} Range: {}", url, range_header);

        let response = self.client()
            .get(url.as_str())
            .insert_header((header::RANGE, range_header))
            .insert_header((header::ACCEPT_ENCODING, "identity"))
            .no_decompress()
            .force_close()
            .send()
            .await
            .map_err(|e| DownloadError::network_error(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .map(|chunk| chunk.map_err(|e| DownloadError::network_error(format!("网络流错误: {}", e))))
            .boxed_local();

        Ok(RangeResponse { status, body })
    }
}
