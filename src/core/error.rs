use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("网络错误: {0}")]
    NetworkError(String),

    #[error("IO错误: {0}")]
    IoError(#[from] io::Error),

    #[error("无效的URL: {0}")]
    InvalidUrl(String),

    #[error("服务器错误: {0}")]
    ServerError(String),

    #[error("服务器未返回有效的 Content-Length")]
    MissingContentLength,

    #[error("文件大小不匹配: 预期 {expected} 字节, 实际 {actual} 字节")]
    SizeMismatch {
        expected: u64,
        actual: u64,
    },

    #[error("配置错误: {0}")]
    Config(String),
}

impl DownloadError {
    /// 分块下载阶段可以重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DownloadError::NetworkError(_) |
            DownloadError::ServerError(_) |
            DownloadError::SizeMismatch { .. } |
            DownloadError::IoError(_)
        )
    }

    /// 启动阶段出现即终止整个任务的错误
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DownloadError::InvalidUrl(_) |
            DownloadError::MissingContentLength |
            DownloadError::Config(_)
        )
    }

    pub fn network_error(msg: impl Into<String>) -> Self {
        DownloadError::NetworkError(msg.into())
    }

    pub fn server_error(msg: impl Into<String>) -> Self {
        DownloadError::ServerError(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        DownloadError::Config(msg.into())
    }
}

impl From<url::ParseError> for DownloadError {
    fn from(error: url::ParseError) -> Self {
        DownloadError::InvalidUrl(error.to_string())
    }
}

pub type DownloadResult<T> = Result<T, DownloadError>;
