use url::Url;

use crate::core::error::DownloadError;
use crate::core::transport::RangeTransport;

/// 探测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeProbe {
    pub content_length: u64,
    pub supports_range: bool,
}

/// 发送一次 HEAD 请求，确认服务器是否支持 Range 并读取文件大小
///
/// 只有 `Accept-Ranges` 严格等于 `bytes` 才算支持，大小写不同或缺失都视为不支持。
/// 传输错误直接返回，不做重试。
pub async fn probe_range_support<T>(transport: &T, url: &Url) -> Result<RangeProbe, DownloadError>
where
    T: RangeTransport + ?Sized,
{
    let response = transport.head(url).await?;

    if !(200..300).contains(&response.status) {
        return Err(DownloadError::server_error(format!("探测请求返回 {}", response.status)));
    }

    let supports_range = response.accept_ranges.as_deref() == Some("bytes");
    let content_length = response.content_length.ok_or(DownloadError::MissingContentLength)?;

    log::info!(
        "探测完成: {} 大小 {} 字节, Accept-Ranges: {:?}",
        url, content_length, response.accept_ranges
    );

    Ok(RangeProbe { content_length, supports_range })
}
