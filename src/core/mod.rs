//! Core: 探测、分块下载、重试、合并等核心逻辑模块

pub mod chunk;
pub mod concat;
pub mod error;
pub mod fetcher;
pub mod pipeline;
pub mod probe;
pub mod retry;
pub mod target;
pub mod transport;
pub mod writer;

#[cfg(test)]
pub(crate) mod test_utils;

// 只导出主流程和其它模块实际用到的类型
pub use error::{DownloadError, DownloadResult};
pub use pipeline::{DownloadOutcome, DownloadReport, Downloader};
pub use transport::{AwcTransport, RangeTransport};
