//! 顺序分块下载
//!
//! 按偏移顺序逐块发送 Range 请求，响应体写入 `<保存路径>-<起始偏移>.chunk`。
//! 失败的分块原地重试，重试次数从整个任务共享的 [`RetryBudget`] 中扣除；
//! 预算耗尽后按 [`ExhaustedPolicy`] 停止下载或跳过当前分块。

use futures::StreamExt;
use url::Url;

use crate::config::ExhaustedPolicy;
use crate::core::chunk::{ChunkDescriptor, ChunkState};
use crate::core::error::DownloadError;
use crate::core::retry::{RetryBudget, RetryStats};
use crate::core::transport::RangeTransport;
use crate::core::writer::ChunkWriter;
use crate::ui::ProgressManager;

const WRITE_BUFFER_SIZE: usize = 256 * 1024;

/// 分块下载结果
#[derive(Debug)]
pub struct FetchReport {
    /// 下载成功的分块，按偏移排序
    pub completed: Vec<ChunkDescriptor>,
    /// 重试耗尽后放弃的分块
    pub failed: Vec<ChunkDescriptor>,
    /// 停止下载后没有请求过的分块
    pub not_attempted: Vec<ChunkDescriptor>,
    /// 按分块序号记录的最终状态
    pub states: Vec<ChunkState>,
    pub retry_stats: RetryStats,
}

impl FetchReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty() && self.not_attempted.is_empty()
    }

    /// 缺失的字节区间（闭区间，已按文件大小截断）
    pub fn missing_ranges(&self) -> Vec<(u64, u64)> {
        let mut ranges: Vec<(u64, u64)> = self.failed.iter()
            .chain(self.not_attempted.iter())
            .map(|c| (c.start, c.start + c.expected_len() - 1))
            .collect();
        ranges.sort_unstable();
        ranges
    }
}

pub struct ChunkFetcher<'a, T: ?Sized> {
    transport: &'a T,
    url: &'a Url,
    content_length: u64,
    policy: ExhaustedPolicy,
    budget: RetryBudget,
    progress: &'a ProgressManager,
}

impl<'a, T> ChunkFetcher<'a, T>
where
    T: RangeTransport + ?Sized,
{
    pub fn new(
        transport: &'a T,
        url: &'a Url,
        content_length: u64,
        max_retries: u32,
        policy: ExhaustedPolicy,
        progress: &'a ProgressManager,
    ) -> Self {
        Self {
            transport,
            url,
            content_length,
            policy,
            budget: RetryBudget::new(max_retries),
            progress,
        }
    }

    /// 按计划顺序下载所有分块
    pub async fn fetch_all(mut self, plan: Vec<ChunkDescriptor>) -> FetchReport {
        let total = plan.len();
        let mut states = vec![ChunkState::Pending; total];
        let mut completed = Vec::new();
        let mut failed = Vec::new();
        let mut not_attempted = Vec::new();

        let mut chunks = plan.into_iter();
        'chunks: while let Some(chunk) = chunks.next() {
            loop {
                states[chunk.index] = ChunkState::Fetching;
                self.progress.start_chunk(chunk.index, total);

                match self.fetch_one(&chunk).await {
                    Ok(written) => {
                        log::info!("分块 {}/{} 完成: {} ({} 字节)", chunk.index + 1, total, chunk.range_header(), written);
                        states[chunk.index] = ChunkState::Done;
                        completed.push(chunk);
                        break;
                    }
                    Err(e) => {
                        log::warn!("分块 {}/{} 下载失败: {} - {}", chunk.index + 1, total, chunk.range_header(), e);
                        if e.is_retryable() && self.budget.record_failure(chunk.start, &e) {
                            self.progress.retry_notice(self.budget.used(), self.budget.max_retries());
                            continue;
                        }

                        states[chunk.index] = ChunkState::Failed;
                        failed.push(chunk);
                        match self.policy {
                            ExhaustedPolicy::Abort => {
                                log::error!("重试次数已用完 ({}/{})，停止下载", self.budget.used(), self.budget.max_retries());
                                self.progress.notice("重试次数已用完，停止下载");
                                not_attempted.extend(chunks.by_ref());
                                break 'chunks;
                            }
                            ExhaustedPolicy::SkipChunk => {
                                log::error!("重试次数已用完 ({}/{})，跳过该分块", self.budget.used(), self.budget.max_retries());
                                break;
                            }
                        }
                    }
                }
            }
        }

        FetchReport {
            completed,
            failed,
            not_attempted,
            states,
            retry_stats: self.budget.stats(),
        }
    }

    /// 下载单个分块，返回写入的字节数
    ///
    /// 临时文件在发请求之前创建，失败时保留已写入的部分。
    async fn fetch_one(&self, chunk: &ChunkDescriptor) -> Result<u64, DownloadError> {
        let mut writer = ChunkWriter::create(&chunk.path, WRITE_BUFFER_SIZE)?;
        let response = self.transport.get_range(self.url, chunk.start, chunk.end).await?;

        // 服务器忽略 Range 时只有首块恰好覆盖整个文件才能接受
        let covers_whole_file = chunk.start == 0 && chunk.expected_len() >= self.content_length;
        if response.status != 206 && !(response.status == 200 && covers_whole_file) {
            return Err(DownloadError::server_error(format!(
                "Range 请求 {} 返回 {}",
                chunk.range_header(),
                response.status
            )));
        }

        let expected = chunk.expected_len();
        let mut body = response.body;
        while let Some(piece) = body.next().await {
            let bytes = piece?;
            writer.write(&bytes)?;
            self.progress.update_chunk(writer.len(), expected);
        }
        writer.flush()?;

        let written = writer.len();
        if written != expected {
            return Err(DownloadError::SizeMismatch { expected, actual: written });
        }
        Ok(written)
    }
}
